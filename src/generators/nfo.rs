//! NFO file generator (Kodi compatible).

use crate::models::media::{MusicVideo, ProbeInfo};
use crate::models::search::{Credits, EpisodeDetail, MovieDetail, TvDetail};
use crate::Result;
use std::path::Path;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Cast entries written per NFO.
const MAX_ACTORS: usize = 20;

/// Generate movie NFO content.
pub fn generate_movie_nfo(movie: &MovieDetail) -> String {
    let mut nfo = String::new();

    nfo.push_str(XML_HEADER);
    nfo.push_str("<movie>\n");

    // Title
    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&movie.title)));
    nfo.push_str(&format!(
        "  <originaltitle>{}</originaltitle>\n",
        escape_xml(&movie.original_title)
    ));
    if let Some(ref tagline) = movie.tagline {
        if !tagline.is_empty() {
            nfo.push_str(&format!("  <tagline>{}</tagline>\n", escape_xml(tagline)));
        }
    }

    // Year and release date
    if let Some(year) = movie.year() {
        nfo.push_str(&format!("  <year>{}</year>\n", year));
    }
    if let Some(ref release_date) = movie.release_date {
        nfo.push_str(&format!("  <premiered>{}</premiered>\n", release_date));
    }
    if let Some(runtime) = movie.runtime {
        nfo.push_str(&format!("  <runtime>{}</runtime>\n", runtime));
    }

    push_rating(&mut nfo, movie.vote_average, movie.vote_count);

    // IDs
    nfo.push_str(&format!(
        "  <uniqueid type=\"tmdb\" default=\"true\">{}</uniqueid>\n",
        movie.id
    ));
    if let Some(ref imdb_id) = movie.imdb_id {
        nfo.push_str(&format!("  <uniqueid type=\"imdb\">{}</uniqueid>\n", imdb_id));
    }

    if let Some(ref overview) = movie.overview {
        nfo.push_str(&format!("  <plot>{}</plot>\n", escape_xml(overview)));
        nfo.push_str(&format!("  <outline>{}</outline>\n", escape_xml(overview)));
    }

    for genre in &movie.genres {
        nfo.push_str(&format!("  <genre>{}</genre>\n", escape_xml(&genre.name)));
    }
    for studio in &movie.production_companies {
        nfo.push_str(&format!("  <studio>{}</studio>\n", escape_xml(&studio.name)));
    }

    // Kodi movie set
    if let Some(ref collection) = movie.belongs_to_collection {
        nfo.push_str("  <set>\n");
        nfo.push_str(&format!("    <name>{}</name>\n", escape_xml(&collection.name)));
        nfo.push_str("  </set>\n");
    }

    push_actors(&mut nfo, movie.credits.as_ref());

    nfo.push_str("</movie>\n");
    nfo
}

/// Generate TV show NFO content.
pub fn generate_tvshow_nfo(show: &TvDetail) -> String {
    let mut nfo = String::new();

    nfo.push_str(XML_HEADER);
    nfo.push_str("<tvshow>\n");

    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&show.name)));
    nfo.push_str(&format!(
        "  <originaltitle>{}</originaltitle>\n",
        escape_xml(&show.original_name)
    ));

    if let Some(year) = show.year() {
        nfo.push_str(&format!("  <year>{}</year>\n", year));
    }
    if let Some(ref date) = show.first_air_date {
        nfo.push_str(&format!("  <premiered>{}</premiered>\n", date));
    }

    // Status and seasons/episodes
    if let Some(ref status) = show.status {
        nfo.push_str(&format!("  <status>{}</status>\n", escape_xml(status)));
    }
    nfo.push_str(&format!("  <season>{}</season>\n", show.number_of_seasons));
    nfo.push_str(&format!("  <episode>{}</episode>\n", show.number_of_episodes));

    push_rating(&mut nfo, show.vote_average, show.vote_count);

    nfo.push_str(&format!(
        "  <uniqueid type=\"tmdb\" default=\"true\">{}</uniqueid>\n",
        show.id
    ));
    // Kodi's TMDB scraper reads the id from here
    nfo.push_str(&format!("  <tmdbid>{}</tmdbid>\n", show.id));
    if let Some(ref group) = show.episode_group {
        nfo.push_str(&format!(
            "  <episodeguide>{{\"tmdb\":\"{}\",\"group\":\"{}\"}}</episodeguide>\n",
            show.id,
            escape_xml(&group.id)
        ));
    }

    if let Some(ref overview) = show.overview {
        nfo.push_str(&format!("  <plot>{}</plot>\n", escape_xml(overview)));
    }

    for genre in &show.genres {
        nfo.push_str(&format!("  <genre>{}</genre>\n", escape_xml(&genre.name)));
    }
    for network in &show.networks {
        nfo.push_str(&format!("  <studio>{}</studio>\n", escape_xml(&network.name)));
    }

    push_actors(&mut nfo, show.credits.as_ref());

    nfo.push_str("</tvshow>\n");
    nfo
}

/// Generate episode NFO content.
pub fn generate_episode_nfo(show_title: &str, episode: &EpisodeDetail) -> String {
    let mut nfo = String::new();

    nfo.push_str(XML_HEADER);
    nfo.push_str("<episodedetails>\n");

    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&episode.name)));
    nfo.push_str(&format!("  <showtitle>{}</showtitle>\n", escape_xml(show_title)));
    nfo.push_str(&format!("  <season>{}</season>\n", episode.season_number));
    nfo.push_str(&format!("  <episode>{}</episode>\n", episode.episode_number));
    if episode.id > 0 {
        nfo.push_str(&format!(
            "  <uniqueid type=\"tmdb\" default=\"true\">{}</uniqueid>\n",
            episode.id
        ));
    }

    if let Some(ref air_date) = episode.air_date {
        nfo.push_str(&format!("  <aired>{}</aired>\n", air_date));
    }
    push_rating(&mut nfo, episode.vote_average, None);

    if let Some(ref overview) = episode.overview {
        nfo.push_str(&format!("  <plot>{}</plot>\n", escape_xml(overview)));
    }

    nfo.push_str("</episodedetails>\n");
    nfo
}

/// Generate music video NFO content with stream details.
pub fn generate_music_video_nfo(video: &MusicVideo, probe: &ProbeInfo) -> String {
    let mut nfo = String::new();

    nfo.push_str(XML_HEADER);
    nfo.push_str("<musicvideo>\n");

    nfo.push_str(&format!("  <title>{}</title>\n", escape_xml(&video.title)));
    nfo.push_str(&format!(
        "  <thumb>{}</thumb>\n",
        escape_xml(&format!("{}-thumb.jpg", video.file_stem()))
    ));
    nfo.push_str(&format!("  <runtime>{}</runtime>\n", (probe.duration / 60.0).ceil() as u64));
    nfo.push_str(&format!(
        "  <dateadded>{}</dateadded>\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    nfo.push_str("  <fileinfo>\n");
    nfo.push_str("    <streamdetails>\n");
    nfo.push_str("      <video>\n");
    nfo.push_str(&format!("        <codec>{}</codec>\n", escape_xml(&probe.video.codec)));
    if !probe.video.aspect.is_empty() {
        nfo.push_str(&format!("        <aspect>{}</aspect>\n", escape_xml(&probe.video.aspect)));
    }
    nfo.push_str(&format!("        <width>{}</width>\n", probe.video.width));
    nfo.push_str(&format!("        <height>{}</height>\n", probe.video.height));
    nfo.push_str(&format!(
        "        <durationinseconds>{}</durationinseconds>\n",
        probe.duration.round() as u64
    ));
    nfo.push_str("      </video>\n");
    nfo.push_str("      <audio>\n");
    nfo.push_str(&format!("        <codec>{}</codec>\n", escape_xml(&probe.audio.codec)));
    if !probe.audio.language.is_empty() {
        nfo.push_str(&format!(
            "        <language>{}</language>\n",
            escape_xml(&probe.audio.language)
        ));
    }
    nfo.push_str(&format!("        <channels>{}</channels>\n", probe.audio.channels));
    nfo.push_str("      </audio>\n");
    nfo.push_str("    </streamdetails>\n");
    nfo.push_str("  </fileinfo>\n");

    nfo.push_str("</musicvideo>\n");
    nfo
}

fn push_rating(nfo: &mut String, rating: Option<f32>, votes: Option<u32>) {
    let Some(rating) = rating else {
        return;
    };
    nfo.push_str("  <ratings>\n");
    nfo.push_str("    <rating name=\"themoviedb\" max=\"10\" default=\"true\">\n");
    nfo.push_str(&format!("      <value>{:.1}</value>\n", rating));
    if let Some(votes) = votes {
        nfo.push_str(&format!("      <votes>{}</votes>\n", votes));
    }
    nfo.push_str("    </rating>\n");
    nfo.push_str("  </ratings>\n");
}

fn push_actors(nfo: &mut String, credits: Option<&Credits>) {
    let Some(credits) = credits else {
        return;
    };
    for (i, actor) in credits.cast.iter().take(MAX_ACTORS).enumerate() {
        nfo.push_str("  <actor>\n");
        nfo.push_str(&format!("    <name>{}</name>\n", escape_xml(&actor.name)));
        if let Some(ref role) = actor.character {
            if !role.is_empty() {
                nfo.push_str(&format!("    <role>{}</role>\n", escape_xml(role)));
            }
        }
        nfo.push_str(&format!("    <order>{}</order>\n", actor.order.unwrap_or(i as u32)));
        nfo.push_str("  </actor>\n");
    }
}

/// Write an NFO, replacing any previous content.
pub fn write_nfo(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        crate::utils::fs::ensure_dir_exists(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

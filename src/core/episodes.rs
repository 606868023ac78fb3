//! Episode and part inference for one show directory.

use crate::core::patterns;
use crate::models::media::{EpisodeFile, SeasonEpisode, ShowDir};
use crate::utils::fs::{filter_tmp_suffix, strip_extension, video_suffix};
use crate::Result;
use std::collections::BTreeMap;

/// Episodes of one show directory keyed by (season, episode).
pub type EpisodeSet = BTreeMap<SeasonEpisode, EpisodeFile>;

/// Infer season and episode for one file of a show directory.
pub fn parse_episode_file(show: &ShowDir, name: &str) -> Option<EpisodeFile> {
    let file_name = filter_tmp_suffix(name);
    let Some(suffix) = video_suffix(&file_name) else {
        tracing::debug!("Not a video, skipped: {}", name);
        return None;
    };

    let mut stem = strip_extension(&file_name, &suffix);
    stem = patterns::filter_optionals(&stem);
    stem = patterns::replace_chs_number(&stem);
    stem = patterns::episode_correcting(&stem);

    let (mut season, episode) = patterns::match_episode(&format!("{}.{}", stem, suffix))?;
    if show.season > 0 {
        season = show.season;
    }

    if season == 0 || episode == 0 {
        tracing::warn!("No season or episode in {:?}", show.full_dir().join(name));
        return None;
    }
    tracing::debug!("Found s{:02}e{:02} in {}", season, episode, name);

    let part = if show.part_mode > 0 {
        patterns::match_part(name)
    } else {
        0
    };

    Some(EpisodeFile {
        dir: show.full_dir(),
        origin_title: file_name,
        suffix,
        season,
        episode,
        part,
        tv_id: show.tv_id,
    })
}

/// Renumber a season's files that are split into parts.
///
/// Mode 1 numbers files sequentially in (season, episode, part) order and
/// assumes no episode is missing. Mode `k >= 2` maps episode `e` part `p` to
/// `(e - 1) * k + p`; a file whose number would overflow is dropped.
pub fn apply_part_correction(files: &mut Vec<EpisodeFile>, mode: u32) {
    match mode {
        0 => {}
        1 => {
            files.sort_by_key(|f| (f.season, f.episode, f.part));
            for (i, file) in files.iter_mut().enumerate() {
                file.episode = i as u32 + 1;
                tracing::debug!("Part mode 1: {} is now {}", file.origin_title, file.key());
            }
        }
        k => files.retain_mut(|file| {
            let Some(episode) = file
                .episode
                .saturating_sub(1)
                .checked_mul(k)
                .and_then(|n| n.checked_add(file.part))
            else {
                tracing::warn!(
                    "Part mode {}: episode {} part {} of {} is out of range, skipped",
                    k,
                    file.episode,
                    file.part,
                    file.origin_title
                );
                return false;
            };
            file.episode = episode;
            tracing::debug!("Part mode {}: {} is now {}", k, file.origin_title, file.key());
            true
        }),
    }
}

/// Collect files into a keyed set; a later file replaces an earlier duplicate.
pub fn into_episode_set(files: Vec<EpisodeFile>) -> EpisodeSet {
    let mut set = EpisodeSet::new();
    for file in files {
        if let Some(previous) = set.insert(file.key(), file) {
            tracing::warn!(
                "Duplicate episode {}: {} replaced",
                previous.key(),
                previous.origin_title
            );
        }
    }
    set
}

/// Scan a show directory's immediate files into an episode set.
pub fn scan_show_files(show: &ShowDir) -> Result<EpisodeSet> {
    let mut names: Vec<String> = std::fs::read_dir(show.full_dir())?
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();

    let mut files: Vec<EpisodeFile> = names
        .iter()
        .filter_map(|name| parse_episode_file(show, name))
        .collect();
    apply_part_correction(&mut files, show.part_mode);

    Ok(into_episode_set(files))
}

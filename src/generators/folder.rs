//! Storage folder and artwork name generator.

use crate::models::search::{MovieDetail, TvDetail};
use crate::utils::fs::sanitize_filename;

/// Movie storage folder.
///
/// Format: `${title} (${year})`
pub fn movie_folder(detail: &MovieDetail) -> String {
    titled_folder(&detail.title, detail.year())
}

/// Show storage folder.
///
/// Format: `${name} (${year})`
pub fn show_folder(detail: &TvDetail) -> String {
    titled_folder(&detail.name, detail.year())
}

/// Collection folder a movie is stored under, empty when it has none.
pub fn collection_folder(detail: &MovieDetail) -> String {
    detail
        .belongs_to_collection
        .as_ref()
        .map(|c| sanitize_filename(c.name.trim()))
        .unwrap_or_default()
}

/// Season folder inside a show folder.
///
/// Format: `S${seasonNr2}`
pub fn season_folder(season: u32) -> String {
    format!("S{:02}", season)
}

/// Season poster name inside a show folder.
pub fn season_poster(season: u32) -> String {
    format!("season{:02}-poster.jpg", season)
}

fn titled_folder(title: &str, year: Option<u16>) -> String {
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    sanitize_filename(&format!("{} ({})", title.trim(), year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::BelongsToCollection;

    #[test]
    fn test_movie_folder() {
        let detail = MovieDetail {
            id: 19995,
            title: "阿凡达: 水之道".to_string(),
            release_date: Some("2022-12-14".to_string()),
            belongs_to_collection: Some(BelongsToCollection {
                id: 87096,
                name: "阿凡达（系列）".to_string(),
            }),
            ..Default::default()
        };

        assert_eq!(movie_folder(&detail), "阿凡达_ 水之道 (2022)");
        assert_eq!(collection_folder(&detail), "阿凡达（系列）");
    }

    #[test]
    fn test_show_folder_without_date() {
        let detail = TvDetail {
            id: 1,
            name: "Dark".to_string(),
            ..Default::default()
        };
        assert_eq!(show_folder(&detail), "Dark ()");
        assert_eq!(season_folder(2), "S02");
        assert_eq!(season_poster(2), "season02-poster.jpg");
    }
}

//! Provider search and detail models.

use serde::{Deserialize, Serialize};

/// Which provider index a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Movie,
    Tv,
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchKind::Movie => write!(f, "movie"),
            SearchKind::Tv => write!(f, "tv"),
        }
    }
}

/// One ordered search request derived from a record's titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryVariant {
    pub title: String,
    pub year: Option<u16>,
}

impl QueryVariant {
    pub fn new(title: &str, year: Option<u16>) -> Self {
        Self {
            title: title.to_string(),
            year,
        }
    }
}

/// Search hit shared by movie and TV search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    /// Localized title (`title` for movies, `name` for shows).
    #[serde(alias = "title", default)]
    pub name: String,
    #[serde(alias = "original_title", default)]
    pub original_name: String,
    /// `release_date` for movies, `first_air_date` for shows.
    #[serde(alias = "release_date", alias = "first_air_date", default)]
    pub date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub popularity: f32,
}

impl SearchResult {
    /// Poster, backdrop and a non-empty overview are all present.
    pub fn is_complete(&self) -> bool {
        has_text(&self.poster_path) && has_text(&self.backdrop_path) && has_text(&self.overview)
    }

    /// Year parsed from the first four characters of the date.
    pub fn year(&self) -> Option<u16> {
        year_of(self.date.as_deref())
    }
}

/// Search response envelope.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Year from a `YYYY-MM-DD` date.
pub fn year_of(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

/// Named entity (genre, network, studio, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Logo image candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageItem {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
}

/// Image collections appended to a detail response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub logos: Vec<ImageItem>,
}

impl Images {
    /// Highest voted logo, a Chinese one preferred.
    pub fn best_logo(&self) -> Option<&ImageItem> {
        let mut logos: Vec<&ImageItem> =
            self.logos.iter().filter(|l| !l.file_path.is_empty()).collect();
        logos.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));
        logos
            .iter()
            .find(|l| l.iso_639_1.as_deref() == Some("zh"))
            .or_else(|| logos.first())
            .copied()
    }
}

/// Cast member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

/// Credits block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// Collection a movie belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BelongsToCollection {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Movie detail, cached as `tmdb/movie.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub production_companies: Vec<Named>,
    #[serde(default)]
    pub belongs_to_collection: Option<BelongsToCollection>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub images: Option<Images>,
    /// Loaded from the local snapshot instead of the provider.
    #[serde(skip)]
    pub from_cache: bool,
}

impl MovieDetail {
    pub fn year(&self) -> Option<u16> {
        year_of(self.release_date.as_deref())
    }
}

/// Season summary inside a show detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

/// Episode as listed by an episode group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupEpisode {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub episode_number: u32,
}

/// One group (usually a season) of an episode group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeGroup {
    #[serde(default)]
    pub name: String,
    pub order: u32,
    #[serde(default)]
    pub episodes: Vec<GroupEpisode>,
}

/// Episode group detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeGroupDetail {
    pub id: String,
    #[serde(default)]
    pub groups: Vec<EpisodeGroup>,
}

/// Show detail, cached as `tmdb/tv.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvDetail {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: u32,
    #[serde(default)]
    pub number_of_episodes: u32,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub networks: Vec<Named>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub episode_group: Option<EpisodeGroupDetail>,
    #[serde(skip)]
    pub from_cache: bool,
}

impl TvDetail {
    pub fn year(&self) -> Option<u16> {
        year_of(self.first_air_date.as_deref())
    }
}

/// Episode detail, cached per episode when it comes from a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeDetail {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(skip)]
    pub from_cache: bool,
}

impl From<&GroupEpisode> for EpisodeDetail {
    fn from(ep: &GroupEpisode) -> Self {
        Self {
            id: ep.id,
            name: ep.name.clone(),
            overview: ep.overview.clone(),
            season_number: ep.season_number,
            episode_number: ep.episode_number,
            air_date: ep.air_date.clone(),
            still_path: ep.still_path.clone(),
            vote_average: None,
            from_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_and_tv_results_share_shape() {
        let movie: SearchResult = serde_json::from_str(
            r#"{"id": 1, "title": "阿凡达", "original_title": "Avatar",
                "release_date": "2009-12-15", "vote_average": 7.5, "popularity": 80.0}"#,
        )
        .unwrap();
        assert_eq!(movie.name, "阿凡达");
        assert_eq!(movie.original_name, "Avatar");
        assert_eq!(movie.year(), Some(2009));

        let tv: SearchResult = serde_json::from_str(
            r#"{"id": 2, "name": "黑暗", "original_name": "Dark",
                "first_air_date": "2017-12-01", "poster_path": "/p.jpg",
                "backdrop_path": "/b.jpg", "overview": "Time travel."}"#,
        )
        .unwrap();
        assert_eq!(tv.original_name, "Dark");
        assert_eq!(tv.year(), Some(2017));
        assert!(tv.is_complete());
    }

    #[test]
    fn test_incomplete_when_overview_blank() {
        let result = SearchResult {
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: Some("/b.jpg".to_string()),
            overview: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!result.is_complete());
    }

    #[test]
    fn test_best_logo_prefers_chinese() {
        let images = Images {
            logos: vec![
                ImageItem {
                    file_path: "/en.png".to_string(),
                    iso_639_1: Some("en".to_string()),
                    vote_average: 9.0,
                },
                ImageItem {
                    file_path: "/zh.png".to_string(),
                    iso_639_1: Some("zh".to_string()),
                    vote_average: 5.0,
                },
            ],
        };
        assert_eq!(images.best_logo().map(|l| l.file_path.as_str()), Some("/zh.png"));
        assert!(Images::default().best_logo().is_none());
    }

    #[test]
    fn test_year_of_short_date() {
        assert_eq!(year_of(Some("")), None);
        assert_eq!(year_of(None), None);
        assert_eq!(year_of(Some("1999")), Some(1999));
    }
}

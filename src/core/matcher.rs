//! Match ranker.
//!
//! Builds the ordered query variants for a record, asks the provider for each
//! in turn and ranks the first non-empty result set.

use crate::models::media::NameInfo;
use crate::models::search::{QueryVariant, SearchKind, SearchResult};
use crate::services::provider::MetadataProvider;
use crate::Result;
use std::cmp::Ordering;

/// Query variants in priority order: Chinese title first, each with the year
/// before without it.
pub fn build_query_variants(name: &NameInfo) -> Vec<QueryVariant> {
    let mut variants = Vec::new();
    for title in [name.chs_title.trim(), name.eng_title.trim()] {
        if title.is_empty() {
            continue;
        }
        if let Some(year) = name.year_opt() {
            variants.push(QueryVariant::new(title, Some(year)));
        }
        variants.push(QueryVariant::new(title, None));
    }
    variants
}

fn matches_title(result: &SearchResult, chs_title: &str, eng_title: &str) -> bool {
    (!chs_title.is_empty() && result.name.contains(chs_title))
        || (!eng_title.is_empty() && result.original_name.contains(eng_title))
}

/// `true` sorts before `false`.
fn prefer(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

/// Stable sort by completeness, exact year, title match, vote and popularity.
pub fn rank_results(results: &mut [SearchResult], chs_title: &str, eng_title: &str, year: Option<u16>) {
    results.sort_by(|a, b| {
        prefer(a.is_complete(), b.is_complete())
            .then_with(|| match year {
                Some(year) => prefer(a.year() == Some(year), b.year() == Some(year)),
                None => Ordering::Equal,
            })
            .then_with(|| {
                prefer(
                    matches_title(a, chs_title, eng_title),
                    matches_title(b, chs_title, eng_title),
                )
            })
            .then_with(|| b.vote_average.total_cmp(&a.vote_average))
            .then_with(|| b.popularity.total_cmp(&a.popularity))
    });
}

/// Search every variant until one returns results, then rank them.
///
/// A failing variant is logged and the next one is tried.
pub async fn search_ranked(
    provider: &dyn MetadataProvider,
    kind: SearchKind,
    name: &NameInfo,
) -> Result<Vec<SearchResult>> {
    let variants = build_query_variants(name);
    if variants.is_empty() {
        return Err(crate::Error::ParseError(
            "no title to search for".to_string(),
        ));
    }

    for variant in &variants {
        tracing::debug!("Searching {} for {:?} ({:?})", kind, variant.title, variant.year);
        let mut results = match provider.search(kind, variant).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Search {} {:?} failed: {}", kind, variant.title, e);
                continue;
            }
        };

        if results.is_empty() {
            continue;
        }

        rank_results(&mut results, &name.chs_title, &name.eng_title, name.year_opt());
        tracing::info!(
            "Search {} {:?} {:?}: {} results, using {} ({})",
            kind,
            variant.title,
            variant.year,
            results.len(),
            results[0].name,
            results[0].id
        );
        return Ok(results);
    }

    Err(crate::Error::NotFound(format!(
        "{} {} {}",
        kind,
        if name.chs_title.is_empty() {
            &name.eng_title
        } else {
            &name.chs_title
        },
        name.year
    )))
}

/// The top ranked result for a record.
pub async fn find_best(
    provider: &dyn MetadataProvider,
    kind: SearchKind,
    name: &NameInfo,
) -> Result<SearchResult> {
    let mut results = search_ranked(provider, kind, name).await?;
    Ok(results.swap_remove(0))
}

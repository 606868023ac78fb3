//! Compiled name patterns and the corrections built on them.

use crate::utils::chinese::convert_numeral;
use once_cell::sync::Lazy;
use regex::Regex;

static EPISODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)((第|s|season)\s*(\d+).*?季?)?(第|e|p|ep|episode)\s*(\d+).+$")
        .expect("valid episode regex")
});
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+).+$").expect("valid number regex"));
static SEASON_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[sS]0?[0-9]+-[sS]0?[0-9]+").expect("valid season range regex"));
static SUB_EPISODES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[eE]0?[0-9]+-[eE]0?[0-9]+").expect("valid sub-episode regex"));
static YEAR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[12][0-9]{3}-[12][0-9]{3}").expect("valid year range regex"));
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[12][0-9]{3}$").expect("valid year regex"));
static FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+[pPiI]|[24][kK])").expect("valid format regex"));
static SEASON: Lazy<Regex> = Lazy::new(|| Regex::new(r"[sS]0?[0-9]+").expect("valid season regex"));
static OPTIONALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[.*?\](\.)?").expect("valid optionals regex"));
static RESOLUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[0-9]{3,4}[x×][0-9]{3,4}").expect("valid resolution regex"));
static CHS_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:第)?([零一二三四五六七八九十百千万亿]+)[季集]").expect("valid numeral regex")
});
static CHS_SEASON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(.*?)(\.)?第([0-9]+)([-至到])?([0-9]+)?季").expect("valid chinese season regex")
});
static CHS_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:第)?([0-9]+)集").expect("valid chinese episode regex"));
static PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.\-_ @][pP]art([0-9])[.\-_ @]").expect("valid part regex"));

/// Earliest and latest accepted release years.
pub const YEAR_MIN: u16 = 1900;
pub const YEAR_MAX: u16 = 2999;

/// Remove `[...]` segments together with one trailing dot.
pub fn filter_optionals(name: &str) -> String {
    OPTIONALS.replace_all(name, "").into_owned()
}

/// Replace Chinese numerals before `季`/`集` with decimal digits.
///
/// `第十二集` → `第12集`.
pub fn replace_chs_number(name: &str) -> String {
    let mut name = name.to_string();
    while let Some(range) = CHS_NUMERAL
        .captures(&name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
    {
        let number = convert_numeral(&name[range.clone()]).to_string();
        name.replace_range(range, &number);
    }
    name
}

/// Rewrite `第N季` as `.SNN` and `第N-M季` as `.SNN-SMM`.
pub fn season_correcting(name: &str) -> String {
    let name = replace_chs_number(name);
    let Some(caps) = CHS_SEASON.captures(&name) else {
        return name;
    };

    let first: u32 = caps[3].parse().unwrap_or(0);
    let replacement = match (caps.get(4), caps.get(5)) {
        (None, None) if first > 0 => format!("S{:02}", first),
        (_, Some(last)) => match last.as_str().parse::<u32>() {
            Ok(last) if first > 0 && last > 0 => format!("S{:02}-S{:02}", first, last),
            _ => return name,
        },
        _ => return name,
    };

    let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let mut corrected = name.clone();
    corrected.replace_range(whole, &format!("{}.{}", prefix, replacement));
    corrected
}

/// Rewrite `第N集` / `N集` as `ENN`.
pub fn episode_correcting(name: &str) -> String {
    let name = replace_chs_number(name);
    let Some(caps) = CHS_EPISODE.captures(&name) else {
        return name;
    };
    let Ok(number) = caps[1].parse::<u32>() else {
        return name;
    };

    let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let mut corrected = name.clone();
    corrected.replace_range(whole, &format!("E{:02}", number));
    corrected
}

/// A name bundling several seasons (`S01-S03`) or years (`2010-2015`).
pub fn is_collection(name: &str) -> bool {
    SEASON_RANGE.is_match(name) || YEAR_RANGE.is_match(name)
}

/// Episode span such as `E01-E38`.
pub fn sub_episodes(name: &str) -> Option<&str> {
    SUB_EPISODES.find(name).map(|m| m.as_str())
}

/// Year span such as `2010-2015`.
pub fn year_range(name: &str) -> Option<&str> {
    YEAR_RANGE.find(name).map(|m| m.as_str())
}

/// Season span such as `S01-S03`.
pub fn season_range(name: &str) -> Option<&str> {
    SEASON_RANGE.find(name).map(|m| m.as_str())
}

/// Last season of a span: `S01-S03` → 3.
pub fn last_season_of_range(range: &str) -> Option<u32> {
    range
        .rsplit('-')
        .next()
        .and_then(|last| last.get(1..))
        .and_then(|digits| digits.parse().ok())
}

/// Bare year token within the accepted range.
pub fn match_year(token: &str) -> Option<u16> {
    if !YEAR.is_match(token) {
        return None;
    }
    token
        .parse()
        .ok()
        .filter(|year| (YEAR_MIN..=YEAR_MAX).contains(year))
}

/// Quality tag contained in a token, e.g. `1080p`, `4K`.
pub fn match_format(token: &str) -> Option<&str> {
    FORMAT.find(token).map(|m| m.as_str())
}

/// `1920x1080`-style resolution contained in a token.
pub fn match_resolution(token: &str) -> Option<&str> {
    RESOLUTION.find(token).map(|m| m.as_str())
}

/// Season tag contained in a token, returning the text before it and the number.
///
/// `黄石S01` → (`黄石`, 1).
pub fn match_season(token: &str) -> Option<(&str, u32)> {
    let m = SEASON.find(token)?;
    let number = m.as_str().get(1..)?.parse().ok()?;
    Some((&token[..m.start()], number))
}

/// Season number carried by a folder name, after corrections.
pub fn folder_season(name: &str) -> Option<u32> {
    let corrected = season_correcting(&filter_optionals(name));
    match_season(&corrected).map(|(_, number)| number)
}

/// Season and episode of an episode file name (with its extension).
///
/// Falls back to the first bare number as the episode, season 1.
pub fn match_episode(name: &str) -> Option<(u32, u32)> {
    if let Some(caps) = EPISODE.captures(name) {
        let season = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1);
        let episode = caps[5].parse().unwrap_or(1);
        return Some((season, episode));
    }

    let caps = NUMBER.captures(name)?;
    Some((1, caps[1].parse().unwrap_or(1)))
}

/// Part number from `.Part2.`-style markers, 0 when absent.
pub fn match_part(name: &str) -> u32 {
    PART.captures(name)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_optionals() {
        assert_eq!(filter_optionals("[GROUP].Show.S01"), "Show.S01");
        assert_eq!(filter_optionals("Show[Extra]S01"), "ShowS01");
    }

    #[test]
    fn test_replace_chs_number() {
        assert_eq!(replace_chs_number("第十二集"), "第12集");
        assert_eq!(replace_chs_number("庆余年第二季"), "庆余年第2季");
        assert_eq!(replace_chs_number("一二三"), "一二三");
    }

    #[test]
    fn test_season_correcting() {
        assert_eq!(season_correcting("庆余年第二季"), "庆余年.S02");
        assert_eq!(season_correcting("庆余年.第2季.2024"), "庆余年.S02.2024");
        assert_eq!(season_correcting("老友记第1-10季"), "老友记.S01-S10");
        assert_eq!(season_correcting("老友记第1至3季"), "老友记.S01-S03");
        assert_eq!(season_correcting("Show.S01"), "Show.S01");
    }

    #[test]
    fn test_episode_correcting() {
        assert_eq!(episode_correcting("第十二集"), "E12");
        assert_eq!(episode_correcting("庆余年 第3集"), "庆余年 E03");
        assert_eq!(episode_correcting("E01"), "E01");
    }

    #[test]
    fn test_collection_markers() {
        assert!(is_collection("Friends.S01-S10.1080p"));
        assert!(is_collection("Iron.Man.2008-2013.Blu-ray"));
        assert!(!is_collection("Show.S02.1080p"));
        assert_eq!(season_range("Friends.S01-S10"), Some("S01-S10"));
        assert_eq!(last_season_of_range("S01-S10"), Some(10));
        assert_eq!(sub_episodes("Heritage.E01-E38.2008"), Some("E01-E38"));
    }

    #[test]
    fn test_match_year() {
        assert_eq!(match_year("2013"), Some(2013));
        assert_eq!(match_year("1080"), None);
        assert_eq!(match_year("1250"), None);
        assert_eq!(match_year("20130"), None);
    }

    #[test]
    fn test_match_season() {
        assert_eq!(match_season("S02"), Some(("", 2)));
        assert_eq!(match_season("黄石S01"), Some(("黄石", 1)));
        assert_eq!(match_season("Season"), None);
        assert_eq!(folder_season("[Sub].Show.第三季"), Some(3));
    }

    #[test]
    fn test_match_episode() {
        assert_eq!(match_episode("E01.mkv"), Some((1, 1)));
        assert_eq!(match_episode("Show.S02E05.1080p.mkv"), Some((2, 5)));
        assert_eq!(match_episode("Show.EP12.mp4"), Some((1, 12)));
        assert_eq!(match_episode("07.mkv"), Some((1, 7)));
        assert_eq!(match_episode("mkv"), None);
    }

    #[test]
    fn test_match_part() {
        assert_eq!(match_part("Show.E01.Part2.mkv"), 2);
        assert_eq!(match_part("Show.E01.mkv"), 0);
    }

    #[test]
    fn test_format_and_resolution() {
        assert_eq!(match_format("1080p"), Some("1080p"));
        assert_eq!(match_format("4K"), Some("4K"));
        assert_eq!(match_format("WEB"), None);
        assert_eq!(match_resolution("1920x1080"), Some("1920x1080"));
        assert_eq!(match_resolution("x264"), None);
    }
}

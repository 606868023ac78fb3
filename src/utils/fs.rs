//! File system utilities.

use crate::Result;
use std::path::Path;

/// Playable video extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "ts", "avi", "wmv", "m4v", "flv", "webm", "mpeg", "mpg", "3gp", "3gpp", "iso",
    "mov", "m2ts", "rmvb",
];

/// Suffixes download clients append to unfinished files.
const TMP_SUFFIXES: &[&str] = &[".part", ".!qB", ".!qb", ".!ut"];

/// Lowercased video extension of a file name, if it is a playable video.
pub fn video_suffix(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    VIDEO_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Remove a trailing `.ext` from a name, ignoring case.
pub fn strip_extension(name: &str, ext: &str) -> String {
    if ext.is_empty() {
        return name.to_string();
    }
    let dotted = format!(".{}", ext);
    match name.len().checked_sub(dotted.len()) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(&dotted) => {
            name[..cut].to_string()
        }
        _ => name.to_string(),
    }
}

/// Remove a download client's temporary suffix, e.g. `a.mkv.part` → `a.mkv`.
pub fn filter_tmp_suffix(name: &str) -> String {
    for tmp in TMP_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(tmp) {
            if video_suffix(stripped).is_some() {
                return stripped.to_string();
            }
        }
    }
    name.to_string()
}

/// Whether a file exists and is not empty.
pub fn non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            _ => c,
        })
        .collect()
}

/// Create the directory if it is missing.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

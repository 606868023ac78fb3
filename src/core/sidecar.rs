//! Sidecar override files kept in an item's `tmdb/` directory.

use crate::Result;
use std::path::Path;

pub const ID_FILE: &str = "id.txt";
pub const SEASON_FILE: &str = "season.txt";
pub const GROUP_FILE: &str = "group.txt";
pub const PART_FILE: &str = "part.txt";

/// Trimmed content of a sidecar file, `None` when absent or blank.
pub fn read_text(dir: &Path, name: &str) -> Option<String> {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let value = content.trim_matches(|c| c == '\r' || c == '\n' || c == ' ');
            (!value.is_empty()).then(|| value.to_string())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}

/// Numeric sidecar value; unparsable content counts as absent.
pub fn read_number(dir: &Path, name: &str) -> Option<u64> {
    let text = read_text(dir, name)?;
    match text.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("Ignoring non-numeric {:?} in {:?}", text, dir.join(name));
            None
        }
    }
}

/// Persist a resolved provider id.
pub fn write_id(dir: &Path, id: u64) -> Result<()> {
    crate::utils::fs::ensure_dir_exists(dir)?;
    std::fs::write(dir.join(ID_FILE), id.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_trims_whitespace() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SEASON_FILE), "3\r\n").unwrap();
        std::fs::write(tmp.path().join(GROUP_FILE), " 5b1c \n").unwrap();

        assert_eq!(read_number(tmp.path(), SEASON_FILE), Some(3));
        assert_eq!(read_text(tmp.path(), GROUP_FILE), Some("5b1c".to_string()));
        assert_eq!(read_text(tmp.path(), PART_FILE), None);
    }

    #[test]
    fn test_invalid_number_is_absent() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PART_FILE), "auto").unwrap();
        assert_eq!(read_number(tmp.path(), PART_FILE), None);
    }

    #[test]
    fn test_write_id_creates_dir() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("tmdb");
        write_id(&cache, 1396).unwrap();
        assert_eq!(read_number(&cache, ID_FILE), Some(1396));
    }
}

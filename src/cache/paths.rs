//! Cache path utilities - uses ~/.cache/draftmeta/ unless overridden

use std::path::{Path, PathBuf};

/// Base cache directory.
/// Uses ~/.cache/draftmeta/ on Unix, %LOCALAPPDATA%/draftmeta/ on Windows.
pub fn get_cache_dir() -> PathBuf {
    let base = if cfg!(windows) {
        std::env::var("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")))
    } else {
        dirs::cache_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".cache"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    };

    base.join("draftmeta")
}

/// Directory holding cached API responses
pub fn get_responses_dir(base: &Path) -> PathBuf {
    base.join("responses")
}

/// Trophy cache file for one (expansion, format)
pub fn get_trophy_cache_path(dir: &Path, expansion: &str, format: &str) -> PathBuf {
    dir.join(format!("{}_{}_trophy_cache.json", expansion, format))
}

/// Ensure a cache directory exists.
pub fn ensure_cache_dir(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_format() {
        let cache = get_cache_dir();
        assert!(cache.to_string_lossy().contains("draftmeta"));
    }

    #[test]
    fn test_trophy_cache_name() {
        let path = get_trophy_cache_path(Path::new("/tmp/out"), "FDN", "PremierDraft");
        assert_eq!(
            path,
            PathBuf::from("/tmp/out/FDN_PremierDraft_trophy_cache.json")
        );
    }

    #[test]
    fn test_ensure_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let created = ensure_cache_dir(&nested).unwrap();
        assert!(created.is_dir());
    }
}

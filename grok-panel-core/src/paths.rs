use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "grok-panel";

/// Persistent web data (cookies, local storage) for the embedded browser.
///
/// `None` when the platform reports no data directory; callers then fall
/// back to the engine's own default store.
pub fn web_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| web_data_dir_in(&base))
}

/// HTTP cache for the embedded browser.
pub fn web_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|base| web_cache_dir_in(&base))
}

fn web_data_dir_in(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME).join("webdata")
}

fn web_cache_dir_in(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME).join("webcache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_are_namespaced_under_app_name() {
        let base = Path::new("/home/user/.local/share");
        assert_eq!(
            web_data_dir_in(base),
            PathBuf::from("/home/user/.local/share/grok-panel/webdata")
        );
        assert_eq!(
            web_cache_dir_in(Path::new("/home/user/.cache")),
            PathBuf::from("/home/user/.cache/grok-panel/webcache")
        );
    }

    #[test]
    fn data_and_cache_dirs_differ() {
        if let (Some(data), Some(cache)) = (web_data_dir(), web_cache_dir()) {
            assert_ne!(data, cache);
            assert!(data.ends_with("grok-panel/webdata"));
        }
    }
}

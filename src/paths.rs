//! Path helpers for XDG search roots and the cache file.

use std::path::PathBuf;

const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Data directories that may contain an `applications` subtree, highest
/// priority first: `XDG_DATA_HOME` (or `~/.local/share`), then each entry of
/// `XDG_DATA_DIRS`. Non-directories are dropped.
pub fn application_data_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    let data_home = env_nonempty("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")));
    if let Some(home) = data_home {
        dirs.push(home);
    }

    let data_dirs = env_nonempty("XDG_DATA_DIRS").unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
    for dir in data_dirs.split(':') {
        let dir = dir.trim_end_matches('/');
        if !dir.is_empty() {
            dirs.push(PathBuf::from(dir));
        }
    }

    dirs.retain(|d| d.is_dir());
    dirs
}

/// Icon theme roots, highest priority first: the user's `~/.icons`, each
/// `XDG_DATA_DIRS` entry joined with `icons`, then the system pixmap
/// directory.
pub fn icon_theme_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".icons"));
    }

    let data_dirs = env_nonempty("XDG_DATA_DIRS").unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
    for dir in data_dirs.split(':') {
        if !dir.is_empty() {
            roots.push(PathBuf::from(dir).join("icons"));
        }
    }

    roots.push(PathBuf::from("/usr/share/pixmaps"));
    roots
}

/// Location of the persisted icon theme cache, typically
/// `~/.cache/open-with/icon-theme-cache.json`.
pub fn icon_cache_file() -> PathBuf {
    let cache_root = env_nonempty("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir);
    cache_root.join("open-with").join("icon-theme-cache.json")
}

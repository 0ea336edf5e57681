//! Icon theme indexing with an mtime-gated disk cache.
//!
//! Each theme root is scanned one subdirectory at a time. A subdirectory's
//! scan is reused across runs via [`IconCache`] until its modification time
//! changes, so a discovery call normally avoids re-walking large theme trees.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Size class given to scalable icons so they outrank any raster size.
const SCALABLE_SIZE: u32 = 100_000;

const ICON_EXTENSIONS: [&str; 3] = ["svg", "png", "xpm"];

/// One theme directory's contribution: its mtime when scanned, and the
/// single largest `(size, path)` per icon base name.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct DirCache {
    mtime: SystemTime,
    icons: HashMap<String, (u32, PathBuf)>,
}

/// The persisted cross-run cache, keyed by theme directory.
///
/// Absent, truncated or corrupt cache files load as an empty cache and
/// trigger a full rescan; persistence failures are logged, never fatal.
pub struct IconCache {
    file: PathBuf,
    dirs: HashMap<PathBuf, DirCache>,
}

impl IconCache {
    /// Load the cache persisted at `file`, or start empty.
    pub fn load(file: PathBuf) -> Self {
        let dirs = fs::read(&file)
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default();
        Self { file, dirs }
    }

    fn save(&self) {
        if let Some(parent) = self.file.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("Failed to create cache directory {}: {err}", parent.display());
                return;
            }
        }
        match serde_json::to_vec(&self.dirs) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.file, raw) {
                    warn!("Failed to persist icon cache {}: {err}", self.file.display());
                }
            }
            Err(err) => warn!("Failed to serialize icon cache: {err}"),
        }
    }
}

/// In-memory merge of every theme directory's best icons, built once per
/// finder and read-only afterwards.
pub struct IconIndex {
    by_name: HashMap<String, (u32, PathBuf)>,
}

impl IconIndex {
    /// Scan `roots` in priority order, rescanning only theme directories
    /// whose mtime differs from the cached one, prune cache entries for
    /// vanished directories, and persist the cache if anything changed.
    pub fn build(roots: &[PathBuf], cache: &mut IconCache) -> Self {
        let mut changed = false;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut by_name: HashMap<String, (u32, PathBuf)> = HashMap::new();

        for root in roots {
            let mut subdirs: Vec<PathBuf> = match fs::read_dir(root) {
                Ok(rd) => rd
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect(),
                Err(_) => continue,
            };
            subdirs.sort();

            for dir in subdirs {
                let mtime = match fs::metadata(&dir).and_then(|m| m.modified()) {
                    Ok(mtime) => mtime,
                    Err(_) => continue,
                };
                seen.insert(dir.clone());

                let stale = cache.dirs.get(&dir).is_none_or(|c| c.mtime != mtime);
                if stale {
                    debug!("Scanning icon theme dir {}", dir.display());
                    let icons = scan_theme_dir(&dir);
                    cache.dirs.insert(dir.clone(), DirCache { mtime, icons });
                    changed = true;
                }

                if let Some(dir_cache) = cache.dirs.get(&dir) {
                    for (name, (size, path)) in &dir_cache.icons {
                        match by_name.entry(name.clone()) {
                            Entry::Vacant(slot) => {
                                slot.insert((*size, path.clone()));
                            }
                            // strictly larger replaces; ties keep the
                            // earlier (higher priority) directory
                            Entry::Occupied(mut slot) => {
                                if *size > slot.get().0 {
                                    slot.insert((*size, path.clone()));
                                }
                            }
                        }
                    }
                }
            }
        }

        let before = cache.dirs.len();
        cache.dirs.retain(|dir, _| seen.contains(dir));
        changed |= cache.dirs.len() != before;

        if changed {
            cache.save();
        }

        debug!("Icon index holds {} names", by_name.len());
        Self { by_name }
    }

    /// Best available absolute path for an icon base name.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.by_name.get(name).map(|(_, path)| path.clone())
    }
}

/// `WxH` directory names like `48x48`; the width is the size class.
fn parse_size_segment(seg: &str) -> Option<u32> {
    let (w, h) = seg.split_once('x')?;
    if w.is_empty()
        || h.is_empty()
        || !w.bytes().all(|b| b.is_ascii_digit())
        || !h.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    w.parse().ok()
}

/// Size class of an icon file: the last `WxH` or `scalable` directory
/// component of its path. With neither, an `.svg` is inherently scalable
/// and anything else classifies as size 0.
fn size_class(path: &Path, ext: &str) -> u32 {
    let mut size = None;
    if let Some(parent) = path.parent() {
        for comp in parent.components() {
            let Some(seg) = comp.as_os_str().to_str() else {
                continue;
            };
            if seg == "scalable" {
                size = Some(SCALABLE_SIZE);
            } else if let Some(px) = parse_size_segment(seg) {
                size = Some(px);
            }
        }
    }
    match size {
        Some(px) => px,
        None if ext == "svg" => SCALABLE_SIZE,
        None => 0,
    }
}

/// Walk one theme directory (sorted, so tie-breaks are reproducible) and
/// reduce it to the largest entry per icon base name.
fn scan_theme_dir(dir: &Path) -> HashMap<String, (u32, PathBuf)> {
    let mut groups: HashMap<String, Vec<(u32, PathBuf)>> = HashMap::new();

    let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !ICON_EXTENSIONS.contains(&ext) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let size = size_class(path, ext);
        groups
            .entry(name.to_string())
            .or_default()
            .push((size, path.to_path_buf()));
    }

    groups
        .into_iter()
        .map(|(name, candidates)| {
            // first candidate in walk order wins ties
            let best = candidates
                .into_iter()
                .reduce(|best, cand| if cand.0 > best.0 { cand } else { best })
                .expect("group is never empty");
            (name, best)
        })
        .collect()
}

//! Program discovery: the public entry point.

use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

use crate::desktop_entry::{ApplicationEntry, ParseOutcome, parse_desktop_file};
use crate::error::DiscoverError;
use crate::icons::{IconCache, IconIndex};
use crate::localize::{current_language, localize};
use crate::paths;

/// One installed application declaring support for a requested file type.
#[derive(Clone, Debug)]
pub struct Program {
    /// Program plus literal arguments.
    pub exec: Vec<String>,
    /// Localized display name.
    pub name: String,
    pub generic_name: String,
    pub comment: String,
    /// Absolute path to a displayable icon, or `None`. Never a bare name.
    pub icon: Option<PathBuf>,
    /// The content types the application declared.
    pub mime_types: BTreeSet<String>,
}

/// Everything environment-derived, captured once per discovery call.
/// Constructible directly so tests can point discovery at fixture trees.
#[derive(Clone, Debug)]
pub struct SearchPaths {
    /// Roots holding `applications` subtrees, highest priority first.
    pub data_dirs: Vec<PathBuf>,
    /// Icon theme roots, highest priority first.
    pub icon_roots: Vec<PathBuf>,
    /// Where the icon theme cache is persisted.
    pub icon_cache_file: PathBuf,
    /// Canonicalized interface language.
    pub language: Option<String>,
}

impl SearchPaths {
    pub fn from_env() -> Self {
        Self {
            data_dirs: paths::application_data_dirs(),
            icon_roots: paths::icon_theme_roots(),
            icon_cache_file: paths::icon_cache_file(),
            language: current_language(),
        }
    }
}

/// Discovers installed programs able to open given file types.
///
/// The icon index is built lazily on the first entry that needs it and then
/// reused, read-only, for the finder's lifetime. The mutex also serializes
/// the cache load-modify-persist sequence across concurrent calls.
pub struct ProgramFinder {
    icon_index: Mutex<Option<IconIndex>>,
}

impl ProgramFinder {
    pub fn new() -> Self {
        Self {
            icon_index: Mutex::new(None),
        }
    }

    /// Discover programs declaring support for any of `extensions`
    /// (e.g. `["jpeg", "jpg"]`), using environment-derived search paths.
    ///
    /// `Ok(vec![])` means the scan succeeded and found nothing; `Err` means
    /// the scan itself failed and the caller should surface a diagnostic.
    pub fn find_programs(&self, extensions: &[&str]) -> Result<Vec<Program>, DiscoverError> {
        self.find_programs_in(&SearchPaths::from_env(), extensions)
    }

    /// Like [`find_programs`](Self::find_programs) with explicit paths.
    pub fn find_programs_in(
        &self,
        paths: &SearchPaths,
        extensions: &[&str],
    ) -> Result<Vec<Program>, DiscoverError> {
        let targets = target_mime_types(extensions);
        debug!("Looking for programs handling {targets:?}");
        let lang = paths.language.as_deref();

        let mut programs = Vec::new();
        for path in collect_desktop_files(&paths.data_dirs).values() {
            let entry = match parse_desktop_file(path) {
                ParseOutcome::Parsed(entry) => entry,
                ParseOutcome::Skipped(_) => continue,
                ParseOutcome::Failed(err) => {
                    debug!("Skipping unreadable {}: {err}", path.display());
                    continue;
                }
            };
            if entry.mime_types.is_disjoint(&targets) {
                continue;
            }

            let icon = self.resolve_icon(&entry, paths)?;
            let name = localize(&entry.name, lang);
            let generic_name = localize(&entry.generic_name, lang);
            let comment = localize(&entry.comment, lang);
            programs.push(Program {
                exec: entry.exec,
                name,
                generic_name,
                comment,
                icon,
                mime_types: entry.mime_types,
            });
        }

        programs.sort_by(|a, b| natord::compare_ignore_case(&a.name, &b.name));
        Ok(programs)
    }

    /// Absolute icon references pass through; bare names go through the
    /// lazily-built icon index; unresolvable names yield `None`.
    fn resolve_icon(
        &self,
        entry: &ApplicationEntry,
        paths: &SearchPaths,
    ) -> Result<Option<PathBuf>, DiscoverError> {
        let Some(name) = entry.icon.as_ref().and_then(|icon| icon.get(&None)) else {
            return Ok(None);
        };
        if name.is_empty() {
            return Ok(None);
        }
        if Path::new(name).is_absolute() {
            return Ok(Some(PathBuf::from(name)));
        }

        let mut slot = self
            .icon_index
            .lock()
            .map_err(|_| DiscoverError::CachePoisoned)?;
        let index = slot.get_or_insert_with(|| {
            let mut cache = IconCache::load(paths.icon_cache_file.clone());
            IconIndex::build(&paths.icon_roots, &mut cache)
        });
        Ok(index.resolve(name))
    }
}

impl Default for ProgramFinder {
    fn default() -> Self {
        Self::new()
    }
}

fn target_mime_types(extensions: &[&str]) -> BTreeSet<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().to_ascii_lowercase())
        .filter_map(|ext| mime_guess::from_ext(&ext).first_raw())
        .map(String::from)
        .collect()
}

/// Collect `*.desktop` files under each data dir's `applications` subtree,
/// deduplicated by base name: the first occurrence, in root priority order,
/// shadows any later one of the same name. Keyed by base name so iteration
/// order is fixed, which keeps equal-name ties in the final sort stable
/// across runs.
fn collect_desktop_files(data_dirs: &[PathBuf]) -> BTreeMap<String, PathBuf> {
    let mut by_base_name = BTreeMap::new();

    for dir in data_dirs {
        let apps = dir.join("applications");
        let walker = WalkDir::new(&apps).follow_links(true).sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                continue;
            }
            let Some(base) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            by_base_name
                .entry(base.to_string())
                .or_insert_with(|| path.to_path_buf());
        }
    }

    by_base_name
}

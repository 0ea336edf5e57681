//! open-with: finds installed programs able to open a given file type.
//!
//! Provides a unified pipeline for Linux desktops:
//! - Desktop application parsing from `.desktop` files
//! - Content-type matching against requested file extensions
//! - Icon lookup across theme directories, size-ranked, cached to disk
//! - Localization of display names against the interface language
//!
//! Discovery walks potentially large directory trees; run it off any
//! latency-sensitive thread and deliver the single result back yourself.

mod desktop_entry;
mod error;
mod finder;
mod icons;
mod localize;
mod paths;

pub use desktop_entry::{
    ApplicationEntry, LocalizedText, ParseOutcome, SkipReason, parse_desktop_file,
};
pub use error::DiscoverError;
pub use finder::{Program, ProgramFinder, SearchPaths};
pub use icons::{IconCache, IconIndex};
pub use localize::{canonicalize_lang, current_language, localize};

/// Convenience function for one-shot discovery with a throwaway finder.
pub fn find_programs(extensions: &[&str]) -> Result<Vec<Program>, DiscoverError> {
    ProgramFinder::new().find_programs(extensions)
}

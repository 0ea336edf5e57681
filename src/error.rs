//! Error types for program discovery.

/// Errors that escape the per-file and per-directory recovery paths.
///
/// Most failures during discovery are recovered locally (a malformed
/// `.desktop` file is skipped, an unreadable directory is skipped, a corrupt
/// cache file triggers a rebuild). Only failures of the whole operation
/// surface here, so callers can tell "nothing found" from "scan failed".
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("icon index lock poisoned by an earlier panic")]
    CachePoisoned,
}

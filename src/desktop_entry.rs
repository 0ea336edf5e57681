//! Desktop entry parsing.
//!
//! A `.desktop` file is parsed in two layers: a line-oriented tokenizer that
//! extracts `key = value` pairs from the `[Desktop Entry]` group, and a
//! semantic layer that interprets those pairs into an [`ApplicationEntry`]
//! or a reason for rejecting the file.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::localize::canonicalize_lang;

/// Language-tagged text. The `None` key holds the default (untranslated)
/// value; other keys are canonicalized primary language subtags.
pub type LocalizedText = HashMap<Option<String>, String>;

/// One validated application registration record.
///
/// Only constructible through the parser, which guarantees a non-empty
/// command line, a non-empty content-type set and a default-keyed name.
#[derive(Clone, Debug)]
pub struct ApplicationEntry {
    /// Program plus literal arguments, never empty.
    pub exec: Vec<String>,
    /// Declared content types, e.g. `image/jpeg`.
    pub mime_types: BTreeSet<String>,
    pub name: LocalizedText,
    pub generic_name: LocalizedText,
    pub comment: LocalizedText,
    /// Default-key value is an absolute path or a bare icon name.
    pub icon: Option<LocalizedText>,
}

/// Why a file produced no entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// `Hidden=true`: the application asked not to be listed.
    Hidden,
    /// `Type` is present and not `Application`.
    NotAnApplication,
    /// No `[Desktop Entry]` group in the file.
    NoDesktopEntryGroup,
    /// Missing one of `Exec`, `MimeType` or a default-keyed `Name`.
    MissingRequiredKeys,
}

/// Outcome of parsing one registration file. Irrelevant files are `Skipped`
/// with a reason; unreadable or non-UTF-8 files are `Failed`.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(ApplicationEntry),
    Skipped(SkipReason),
    Failed(io::Error),
}

impl ParseOutcome {
    pub fn into_entry(self) -> Option<ApplicationEntry> {
        match self {
            ParseOutcome::Parsed(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Parse a `.desktop` file into an [`ApplicationEntry`].
pub fn parse_desktop_file(path: &Path) -> ParseOutcome {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => return ParseOutcome::Failed(err),
    };
    parse_desktop_data(&raw)
}

fn group_header(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() { None } else { Some(inner) }
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim_end();
    let value = value.trim_start();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    let valid_key = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '[' | ']' | '@' | '_' | '.'));
    if !valid_key {
        return None;
    }
    Some((key, value))
}

/// Collect the `key = value` pairs of the `[Desktop Entry]` group, in file
/// order. Scanning stops at the first group header after that group: later
/// groups never override its keys. `None` if the group is absent.
fn desktop_entry_pairs(raw: &str) -> Option<Vec<(&str, &str)>> {
    let mut group: Option<&str> = None;
    let mut seen = false;
    let mut pairs = Vec::new();

    for line in raw.lines() {
        if let Some(header) = group_header(line) {
            if group == Some("Desktop Entry") {
                break;
            }
            seen |= header == "Desktop Entry";
            group = Some(header);
            continue;
        }
        if group == Some("Desktop Entry") {
            if let Some(pair) = key_value(line) {
                pairs.push(pair);
            }
        }
    }

    if seen { Some(pairs) } else { None }
}

/// Split a `base[langtag]` key into its base name and canonicalized
/// language; a bracket-less key maps to the default (`None`) language.
fn parse_localized_key(key: &str) -> (&str, Option<String>) {
    match key.split_once('[') {
        Some((base, rest)) => {
            let tag = rest.strip_suffix(']').unwrap_or(rest);
            (base, canonicalize_lang(tag))
        }
        None => (key, None),
    }
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Shell-word-split an `Exec=` value, after unescaping `\\` to `\`. The
/// command line is kept only if it is non-empty and its first word is either
/// a bare/relative name or an absolute path with an execute bit set.
fn split_exec(value: &str) -> Option<Vec<String>> {
    let unquoted = value.replace("\\\\", "\\");
    let cmdline = shlex::split(&unquoted)?;
    let first = Path::new(cmdline.first()?);
    if first.is_absolute() && !is_executable(first) {
        return None;
    }
    Some(cmdline)
}

fn parse_desktop_data(raw: &str) -> ParseOutcome {
    let Some(pairs) = desktop_entry_pairs(raw) else {
        return ParseOutcome::Skipped(SkipReason::NoDesktopEntryGroup);
    };

    let mut exec: Option<Vec<String>> = None;
    let mut mime_types: Option<BTreeSet<String>> = None;
    let mut fields: HashMap<&str, LocalizedText> = HashMap::new();

    for (key, value) in pairs {
        match key {
            "Hidden" if value == "true" => return ParseOutcome::Skipped(SkipReason::Hidden),
            "Type" if value != "Application" => {
                return ParseOutcome::Skipped(SkipReason::NotAnApplication);
            }
            "Type" => {}
            "Exec" => {
                // an invalid Exec drops this key only, not the file
                if let Some(cmdline) = split_exec(value) {
                    exec = Some(cmdline);
                }
            }
            "MimeType" => {
                mime_types = Some(
                    value
                        .split(';')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            _ => {
                let (base, lang) = parse_localized_key(key);
                if matches!(base, "Name" | "GenericName" | "Comment" | "Icon") {
                    fields.entry(base).or_default().insert(lang, value.to_string());
                }
                // other keys carry nothing we use; dropped
            }
        }
    }

    let name = fields.remove("Name").unwrap_or_default();
    match (exec, mime_types) {
        (Some(exec), Some(mime_types))
            if !mime_types.is_empty() && name.contains_key(&None) =>
        {
            ParseOutcome::Parsed(ApplicationEntry {
                exec,
                mime_types,
                name,
                generic_name: fields.remove("GenericName").unwrap_or_default(),
                comment: fields.remove("Comment").unwrap_or_default(),
                icon: fields.remove("Icon"),
            })
        }
        _ => ParseOutcome::Skipped(SkipReason::MissingRequiredKeys),
    }
}

//! Localized string selection.

use crate::desktop_entry::LocalizedText;

/// Reduce a locale identifier to its canonical primary subtag: the portion
/// before the first `_`, `.` or `@`, lowercased. `fr_FR.UTF-8` and `fr_CA`
/// both canonicalize to `fr`. Returns `None` for an empty tag.
pub fn canonicalize_lang(tag: &str) -> Option<String> {
    let primary = tag.split(['_', '.', '@']).next().unwrap_or("").trim();
    if primary.is_empty() {
        return None;
    }
    Some(primary.to_ascii_lowercase())
}

/// Pick the best value out of a language-tagged mapping: the entry for the
/// canonicalized `lang` if present, else the default (untranslated) entry,
/// else the empty string.
pub fn localize(text: &LocalizedText, lang: Option<&str>) -> String {
    if let Some(value) = lang
        .and_then(canonicalize_lang)
        .and_then(|l| text.get(&Some(l)))
    {
        return value.clone();
    }
    text.get(&None).cloned().unwrap_or_default()
}

/// The current interface language, canonicalized, from the usual locale
/// variables. The `C` and `POSIX` locales count as "no language".
pub fn current_language() -> Option<String> {
    for var in ["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"] {
        let Some(value) = std::env::var(var).ok().filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        // LANGUAGE may hold a colon-separated priority list
        let first = value.split(':').next().unwrap_or(&value);
        if let Some(lang) = canonicalize_lang(first) {
            if lang == "c" || lang == "posix" {
                continue;
            }
            return Some(lang);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Use a mutex to ensure tests that modify env vars don't race
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn text(entries: &[(Option<&str>, &str)]) -> LocalizedText {
        entries
            .iter()
            .map(|(lang, value)| (lang.map(String::from), value.to_string()))
            .collect()
    }

    #[test]
    fn test_canonicalize_lang() {
        assert_eq!(canonicalize_lang("fr"), Some("fr".to_string()));
        assert_eq!(canonicalize_lang("fr_FR.UTF-8"), Some("fr".to_string()));
        assert_eq!(canonicalize_lang("sr@latin"), Some("sr".to_string()));
        assert_eq!(canonicalize_lang("PT_BR"), Some("pt".to_string()));
        assert_eq!(canonicalize_lang(""), None);
    }

    #[test]
    fn test_localize_prefers_current_language() {
        let text = text(&[(Some("fr"), "Ouvrir"), (None, "Open")]);
        assert_eq!(localize(&text, Some("fr")), "Ouvrir");
        assert_eq!(localize(&text, Some("fr_CA")), "Ouvrir");
    }

    #[test]
    fn test_localize_falls_back_to_default() {
        let text = text(&[(Some("fr"), "Ouvrir"), (None, "Open")]);
        assert_eq!(localize(&text, Some("de")), "Open");
        assert_eq!(localize(&text, None), "Open");
    }

    #[test]
    fn test_localize_empty_mapping() {
        assert_eq!(localize(&LocalizedText::new(), Some("fr")), "");
        assert_eq!(localize(&LocalizedText::new(), None), "");
    }

    #[test]
    fn test_current_language_skips_c_locale() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe {
            env::set_var("LC_ALL", "C.UTF-8");
            env::set_var("LC_MESSAGES", "de_DE.UTF-8");
        }
        assert_eq!(current_language(), Some("de".to_string()));
        unsafe {
            env::remove_var("LC_ALL");
            env::remove_var("LC_MESSAGES");
        }
    }
}

// i18n.rs
//
// Runtime string table:
// - Spanish strings are compiled in and always act as the fallback.
// - Other languages (or local overrides) live in assets/i18n/<lang>.json,
//   searched next to the executable and then in the working directory.
// - Lookup: tr("key") / tr_with("key", &[("name", ...)]) with {name} placeholders.

use once_cell::sync::{Lazy, OnceCell};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "es";

pub const LANGUAGES: [(&str, &str); 2] = [("es", "Español"), ("en", "English")];

const BUILTIN_ES: &str = include_str!("../assets/i18n/es.json");

static BUILTIN: Lazy<HashMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(BUILTIN_ES).unwrap_or_else(|e| {
        log::error!("built-in strings are malformed: {e}");
        HashMap::new()
    })
});

static TABLE: OnceCell<RwLock<HashMap<String, String>>> = OnceCell::new();

fn load_json_map(path: &Path) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(map) => Some(map),
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

fn find_lang_file(lang: &str) -> Option<PathBuf> {
    let file = format!("{lang}.json");

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::new()))
        .map(|base| base.join("assets").join("i18n").join(&file))
        .find(|p| p.exists())
}

/// Selects the active language. Later calls replace the previous table.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let map = find_lang_file(&lang)
        .and_then(|p| load_json_map(&p))
        .unwrap_or_default();

    if map.is_empty() && lang != FALLBACK_LANG {
        log::warn!("no strings found for '{lang}', falling back to '{FALLBACK_LANG}'");
    }

    let lock = TABLE.get_or_init(|| RwLock::new(HashMap::new()));
    match lock.write() {
        Ok(mut table) => *table = map,
        Err(poisoned) => *poisoned.into_inner() = map,
    }
}

/// Localized text; the key itself when nothing matches.
pub fn tr(key: &str) -> String {
    if let Some(v) = TABLE
        .get()
        .and_then(|l| l.read().ok())
        .and_then(|t| t.get(key).cloned())
    {
        return v;
    }
    BUILTIN.get(key).cloned().unwrap_or_else(|| key.to_string())
}

/// `{name}` placeholders not provided are kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_spanish_is_always_available() {
        assert_eq!(tr("menu.file"), "Archivo");
    }

    #[test]
    fn every_init_replaces_the_active_table() {
        init("xx-missing");
        init(FALLBACK_LANG);
        let table = TABLE.get().expect("table installed by init");
        assert!(table.read().is_ok());
        assert_eq!(tr("menu.file"), "Archivo");
    }

    #[test]
    fn missing_key_returns_the_key() {
        assert_eq!(tr("no.such.key"), "no.such.key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let s = tr_with(
            "dialog.discount.bonus",
            &[("bonus", "20".into()), ("cash", "8".into())],
        );
        assert_eq!(s, "Bonificación 20% + Contado 8%");
        assert_eq!(tr_with("dialog.discount.bonus", &[]), tr("dialog.discount.bonus"));
    }
}

// config.rs: command line and environment
//
//   --lang <code>         (env CATALOG360_LANG, default es)
//   --background <path>   panorama image, default background360.jpg
//   --catalog <path>      product list, default assets/catalog.json

use std::path::PathBuf;

pub const LANG_ENV: &str = "CATALOG360_LANG";
pub const DEFAULT_BACKGROUND: &str = "background360.jpg";
pub const DEFAULT_CATALOG: &str = "assets/catalog.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub lang: String,
    pub background: PathBuf,
    pub catalog: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lang: crate::i18n::FALLBACK_LANG.to_string(),
            background: PathBuf::from(DEFAULT_BACKGROUND),
            catalog: PathBuf::from(DEFAULT_CATALOG),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1), std::env::var(LANG_ENV).ok())
    }

    /// CLI wins over the environment. Unknown arguments are ignored.
    pub fn from_args<I>(args: I, env_lang: Option<String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = env_lang.filter(|v| !v.trim().is_empty()) {
            cfg.lang = v;
        }

        let mut it = args.into_iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "--lang" => {
                    if let Some(v) = it.next() {
                        cfg.lang = v;
                    }
                }
                "--background" => {
                    if let Some(v) = it.next() {
                        cfg.background = PathBuf::from(v);
                    }
                }
                "--catalog" => {
                    if let Some(v) = it.next() {
                        cfg.catalog = PathBuf::from(v);
                    }
                }
                _ => {}
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(AppConfig::from_args(Vec::new(), None), AppConfig::default());
    }

    #[test]
    fn cli_overrides_environment() {
        let cfg = AppConfig::from_args(args(&["--lang", "en", "--catalog", "x.json"]), Some("es".into()));
        assert_eq!(cfg.lang, "en");
        assert_eq!(cfg.catalog, PathBuf::from("x.json"));
        assert_eq!(cfg.background, PathBuf::from(DEFAULT_BACKGROUND));
    }

    #[test]
    fn blank_env_and_dangling_flag_are_ignored() {
        let cfg = AppConfig::from_args(args(&["--verbose", "--background"]), Some("  ".into()));
        assert_eq!(cfg, AppConfig::default());
    }
}

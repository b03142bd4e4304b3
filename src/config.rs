use crate::i18n::LanguageItem;
use crate::session::{idle_timeout_from_minutes, DEFAULT_IDLE_TIMEOUT_MINUTES};
use anyhow::{bail, Context, Result};

/// Languages registered when `SUPPORTED_LANGUAGES` is not set.
pub const DEFAULT_SUPPORTED_LANGUAGES: &str = "en:English:en-US,el:Greek:el-GR";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Session
    pub session_cookie_name: String,
    pub session_idle_timeout_minutes: i64,

    // Localization
    pub languages: Vec<LanguageItem>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let languages = std::env::var("SUPPORTED_LANGUAGES")
            .unwrap_or_else(|_| DEFAULT_SUPPORTED_LANGUAGES.to_string());

        let session_cookie_name = std::env::var("SESSION_COOKIE_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "sid".to_string());
        if !is_valid_cookie_name(&session_cookie_name) {
            bail!(
                "SESSION_COOKIE_NAME '{}' is not a valid cookie name",
                session_cookie_name
            );
        }

        let session_idle_timeout_minutes = std::env::var("SESSION_IDLE_TIMEOUT_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|minutes: &i64| *minutes > 0)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT_MINUTES);
        if idle_timeout_from_minutes(session_idle_timeout_minutes).is_none() {
            bail!(
                "SESSION_IDLE_TIMEOUT_MINUTES {} is out of range",
                session_idle_timeout_minutes
            );
        }

        Ok(Self {
            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Session
            session_cookie_name,
            session_idle_timeout_minutes,

            // Localization
            languages: parse_languages(&languages).context("SUPPORTED_LANGUAGES is invalid")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            session_cookie_name: "sid".to_string(),
            session_idle_timeout_minutes: DEFAULT_IDLE_TIMEOUT_MINUTES,
            languages: vec![
                LanguageItem::new("English", "en", "en-US"),
                LanguageItem::new("Greek", "el", "el-GR"),
            ],
        }
    }
}

/// A cookie name must be an RFC 6265 token: visible ASCII with no separators.
pub fn is_valid_cookie_name(name: &str) -> bool {
    const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={}";
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(&b))
}

/// Parse a comma-separated list of `code:name:culture` entries.
///
/// Culture codes are not validated here; the registry rejects malformed ones
/// when the languages are registered.
pub fn parse_languages(list: &str) -> Result<Vec<LanguageItem>> {
    let mut languages = Vec::new();

    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let [code, name, culture_code] = parts.as_slice() else {
            bail!("Invalid language entry '{}'. Expected code:name:culture", entry);
        };
        if code.is_empty() || name.is_empty() || culture_code.is_empty() {
            bail!("Invalid language entry '{}'. Empty field", entry);
        }
        languages.push(LanguageItem::new(*name, *code, *culture_code));
    }

    if languages.is_empty() {
        bail!("No languages configured");
    }

    Ok(languages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env_vars() {
        for key in [
            "PORT",
            "SESSION_COOKIE_NAME",
            "SESSION_IDLE_TIMEOUT_MINUTES",
            "SUPPORTED_LANGUAGES",
        ] {
            std::env::remove_var(key);
        }
    }

    // ==================== parse_languages Tests ====================

    #[test]
    fn test_parse_default_languages() {
        let languages = parse_languages(DEFAULT_SUPPORTED_LANGUAGES).unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0], LanguageItem::new("English", "en", "en-US"));
        assert_eq!(languages[1], LanguageItem::new("Greek", "el", "el-GR"));
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_trailing_comma() {
        let languages = parse_languages(" en : English : en-GB , fr:Français:fr-FR, ").unwrap();
        let codes: Vec<_> = languages.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "fr"]);
        assert_eq!(languages[0].culture_code, "en-GB");
        assert_eq!(languages[1].name, "Français");
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(parse_languages("en:English").is_err());
        assert!(parse_languages("en:English:en-US:extra").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_field() {
        assert!(parse_languages("en::en-US").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_list() {
        assert!(parse_languages("").is_err());
        assert!(parse_languages(" , ").is_err());
    }

    // ==================== Cookie Name Tests ====================

    #[test]
    fn test_cookie_name_tokens() {
        assert!(is_valid_cookie_name("sid"));
        assert!(is_valid_cookie_name("visitor_session-2"));

        for name in ["", "a=b", "a;b", "a b", "a,b", "\"sid\"", "sïd", "a\tb"] {
            assert!(!is_valid_cookie_name(name), "{:?} accepted", name);
        }
    }

    // ==================== from_env Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env_vars();

        let config = Config::from_env().expect("defaults load");
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_cookie_name, "sid");
        assert_eq!(config.session_idle_timeout_minutes, 20);
        assert_eq!(config.languages, Config::default().languages);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env_vars();
        std::env::set_var("PORT", "9090");
        std::env::set_var("SESSION_COOKIE_NAME", "visitor");
        std::env::set_var("SESSION_IDLE_TIMEOUT_MINUTES", "5");
        std::env::set_var("SUPPORTED_LANGUAGES", "de:Deutsch:de-DE");

        let config = Config::from_env().expect("overrides load");
        assert_eq!(config.port, 9090);
        assert_eq!(config.session_cookie_name, "visitor");
        assert_eq!(config.session_idle_timeout_minutes, 5);
        assert_eq!(config.languages.len(), 1);
        assert_eq!(config.languages[0].code, "de");

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparseable_numbers() {
        clear_env_vars();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("SESSION_IDLE_TIMEOUT_MINUTES", "-3");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_idle_timeout_minutes, 20);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_out_of_range_timeout() {
        clear_env_vars();
        std::env::set_var("SESSION_IDLE_TIMEOUT_MINUTES", "9999999999999999");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SESSION_IDLE_TIMEOUT_MINUTES"));

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_cookie_names() {
        for name in ["a=b", "a;b", "a b"] {
            clear_env_vars();
            std::env::set_var("SESSION_COOKIE_NAME", name);

            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("SESSION_COOKIE_NAME"), "{:?}", name);
        }

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_languages() {
        clear_env_vars();
        std::env::set_var("SUPPORTED_LANGUAGES", "broken");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SUPPORTED_LANGUAGES"));

        clear_env_vars();
    }
}

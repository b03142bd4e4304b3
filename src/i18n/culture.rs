//! Culture: a parsed, normalized locale tag and the culture active for a request.
//!
//! A `Culture` is what a `LanguageItem`'s culture code turns into. The locale
//! middleware installs one per request as a [`RequestCulture`], which handlers
//! can read either from request extensions or through [`current_culture`].

use crate::error::{LocalizationError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Accepts `ll`, `ll-RR`, `ll-Ssss`, `ll-Ssss-RR` with `-` or `_` separators.
/// Regions may be alphabetic (`US`) or UN M.49 numeric (`419`).
static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{2,3})(?:[-_]([A-Za-z]{4}))?(?:[-_]([A-Za-z]{2}|[0-9]{3}))?$")
            .expect("culture tag pattern is valid")
    })
}

/// A locale derived from a culture code such as `en-US` or `el-GR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Culture {
    language: String,
    script: Option<String>,
    region: Option<String>,
}

impl Culture {
    /// Parse a culture code, normalizing casing (`en-us` becomes `en-US`).
    ///
    /// # Returns
    /// * `Ok(Culture)` for a well-formed tag
    /// * `Err(LocalizationError::MalformedCultureCode)` otherwise
    pub fn parse(culture_code: &str) -> Result<Culture> {
        let trimmed = culture_code.trim();
        let captures =
            tag_pattern()
                .captures(trimmed)
                .ok_or_else(|| LocalizationError::MalformedCultureCode {
                    culture_code: culture_code.to_string(),
                })?;

        let language = captures[1].to_ascii_lowercase();
        let script = captures.get(2).map(|m| title_case(m.as_str()));
        let region = captures.get(3).map(|m| m.as_str().to_ascii_uppercase());

        Ok(Culture {
            language,
            script,
            region,
        })
    }

    /// The language subtag, e.g. `en`.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The script subtag, e.g. `Hans`, if present.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// The region subtag, e.g. `US`, if present.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The canonical tag, e.g. `en-US`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// en-US, the culture of the synthetic default language.
    pub fn en_us() -> Culture {
        Culture {
            language: "en".to_string(),
            script: None,
            region: Some("US".to_string()),
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(script) = &self.script {
            write!(f, "-{}", script)?;
        }
        if let Some(region) = &self.region {
            write!(f, "-{}", region)?;
        }
        Ok(())
    }
}

impl Serialize for Culture {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn title_case(subtag: &str) -> String {
    let lower = subtag.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// The cultures in effect while a single request is handled.
///
/// Formatting culture and UI culture are always the same value; there is no
/// way to construct one with diverging halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCulture {
    culture: Culture,
    ui_culture: Culture,
}

impl RequestCulture {
    pub fn new(culture: Culture) -> Self {
        Self {
            ui_culture: culture.clone(),
            culture,
        }
    }

    /// Culture used for formatting numbers and dates.
    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    /// Culture used for resource lookup.
    pub fn ui_culture(&self) -> &Culture {
        &self.ui_culture
    }
}

tokio::task_local! {
    static CURRENT_CULTURE: RequestCulture;
}

/// Run `future` with `culture` installed as the active request culture.
pub async fn scope<F>(culture: RequestCulture, future: F) -> F::Output
where
    F: std::future::Future,
{
    CURRENT_CULTURE.scope(culture, future).await
}

/// The culture installed by the locale middleware for the running request.
///
/// Returns `None` outside request handling, or inside tasks spawned off the
/// request task (task-local values do not propagate into `tokio::spawn`).
pub fn current_culture() -> Option<RequestCulture> {
    CURRENT_CULTURE.try_with(|culture| culture.clone()).ok()
}

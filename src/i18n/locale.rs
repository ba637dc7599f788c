//! Locale type: a validated locale code threaded through every operation.

use crate::error::{ContentError, ContentResult};
use serde::Serialize;
use std::fmt;

/// Locale used when a request carries none.
pub const DEFAULT_LOCALE: &str = "en";

const MAX_CODE_LEN: usize = 10;

/// A well-formed locale code (e.g. "en", "ru", "pt-br").
///
/// Well-formed is not the same as published: an unregistered code such as
/// "fr" is a valid `Locale`, and text for it resolves through the fallback
/// chain instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Parse a locale code. Empty input yields the default locale.
    ///
    /// Codes are lowercased; they must be at most 10 characters of ASCII
    /// letters, digits, `-` or `_`.
    pub fn parse(code: &str) -> ContentResult<Locale> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(Locale::default());
        }

        if code.len() > MAX_CODE_LEN
            || !code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ContentError::validation(format!(
                "invalid locale code '{}'",
                code
            )));
        }

        Ok(Locale(code.to_ascii_lowercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Locale registry: the languages the site is published in.
//!
//! Locales outside the registry are still accepted by core operations (their
//! text resolves through the fallback chain); the registry only drives what
//! the site advertises as available.

use serde::Serialize;
use std::sync::OnceLock;

/// Configuration for a published site language.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleConfig {
    /// Locale code (e.g., "en", "ru")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Russian")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Русский")
    pub native_name: &'static str,

    /// Whether this is the site's default language (only one should be true)
    #[serde(skip)]
    pub is_default: bool,

    /// Whether this language is published
    #[serde(skip)]
    pub enabled: bool,
}

/// Global locale registry singleton, immutable after first access.
#[derive(Debug)]
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get all published locales, in registry order.
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// Get the default locale configuration.
    ///
    /// Falls back to the first registered locale if none is flagged default.
    pub fn default_locale(&self) -> Option<&LocaleConfig> {
        self.locales
            .iter()
            .find(|locale| locale.is_default)
            .or_else(|| self.locales.first())
    }
}

fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            enabled: true,
        },
        LocaleConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_default: false,
            enabled: true,
        },
        LocaleConfig {
            code: "pl",
            name: "Polish",
            native_name: "Polski",
            is_default: false,
            enabled: true,
        },
    ]
}

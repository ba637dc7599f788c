//! Site service: the entry point for every core operation.
//!
//! Operations are split by area across `categories`, `catalog`, `search`,
//! `sitemap` and `feedback`, each adding an `impl SiteService` block. The
//! service holds no per-request state; the locale is an explicit argument
//! everywhere.

use crate::config::Config;
use crate::error::ContentResult;
use crate::i18n::{resolve, Locale, LocaleConfig, LocaleRegistry, Translation};
use crate::store::ContentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct SiteService {
    store: Arc<dyn ContentStore>,
    config: Config,
}

impl SiteService {
    pub fn new(store: Arc<dyn ContentStore>, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Parse a request locale; blank input selects the configured default.
    pub fn locale(&self, code: &str) -> ContentResult<Locale> {
        if code.trim().is_empty() {
            return Locale::parse(&self.config.default_locale);
        }
        Locale::parse(code)
    }

    /// Languages the site is published in
    pub fn available_languages(&self) -> Vec<&'static LocaleConfig> {
        LocaleRegistry::get().list_enabled()
    }

    /// Translation to render for `locale`, falling back to the configured
    /// default locale and then the smallest locale code.
    pub(crate) fn pick<'a, T: Translation>(
        &self,
        translations: &'a [T],
        locale: &Locale,
    ) -> Option<&'a T> {
        resolve(translations, locale, &self.config.default_locale)
    }

    /// Resolve and project one text field; empty when nothing is translated.
    pub(crate) fn text<T: Translation>(
        &self,
        translations: &[T],
        locale: &Locale,
        field: impl Fn(&T) -> &str,
    ) -> String {
        self.pick(translations, locale)
            .map(|t| field(t).to_string())
            .unwrap_or_default()
    }
}

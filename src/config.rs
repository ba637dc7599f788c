use crate::i18n::{LocaleRegistry, DEFAULT_LOCALE};
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Site
    pub site_url: String,
    pub default_locale: String,

    // Server
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            // Site - sitemap locations are built from this, so no trailing slash
            site_url: std::env::var("SITE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            default_locale: std::env::var("DEFAULT_LOCALE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(registry_default_locale),

            // Server
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Config for tests and tools that never touch Postgres.
    pub fn for_site(site_url: &str) -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: 1,
            site_url: site_url.trim_end_matches('/').to_string(),
            default_locale: registry_default_locale(),
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    /// Address string for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Database URL with the userinfo part masked, safe to log
    pub fn redacted_database_url(&self) -> String {
        match (self.database_url.find("://"), self.database_url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => format!(
                "{}://***@{}",
                &self.database_url[..scheme_end],
                &self.database_url[at + 1..]
            ),
            _ => self.database_url.clone(),
        }
    }
}

/// Code of the registry's default language
fn registry_default_locale() -> String {
    LocaleRegistry::get()
        .default_locale()
        .map(|locale| locale.code)
        .unwrap_or(DEFAULT_LOCALE)
        .to_string()
}

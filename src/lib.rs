//! Localized catalog and content API for a multilingual company site.
//!
//! `SiteService` is the entry point for every operation; `routes` exposes it
//! over HTTP and `store` abstracts the persistence engine.

pub mod catalog;
pub mod categories;
pub mod config;
pub mod dto;
pub mod error;
pub mod feedback;
pub mod i18n;
pub mod models;
pub mod query;
pub mod routes;
pub mod search;
pub mod service;
pub mod sitemap;
pub mod store;

pub use config::Config;
pub use error::{ContentError, ContentResult};
pub use service::SiteService;

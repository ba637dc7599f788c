//! Internationalization (i18n): locale codes, the published-language
//! registry and translation resolution.
//!
//! - `locale`: validated `Locale` passed explicitly into every operation
//! - `registry`: the languages the site publishes
//! - `resolver`: picks the translation to render for a requested locale

mod locale;
mod registry;
mod resolver;

pub use locale::{Locale, DEFAULT_LOCALE};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use resolver::{resolve, Translation};

//! Translation resolution with a deterministic fallback chain.

use crate::i18n::Locale;

/// A locale-specific text bundle attached to a translatable entity.
pub trait Translation {
    fn locale(&self) -> &str;
}

/// Pick the translation to render for `requested`.
///
/// Order of preference:
/// 1. the requested locale
/// 2. the site default locale (`fallback`)
/// 3. the lexicographically smallest locale code present
///
/// Returns `None` only when the entity has no translations at all; callers
/// render empty text in that case. A missing locale is never an error.
pub fn resolve<'a, T: Translation>(
    translations: &'a [T],
    requested: &Locale,
    fallback: &str,
) -> Option<&'a T> {
    translations
        .iter()
        .find(|t| t.locale() == requested.code())
        .or_else(|| translations.iter().find(|t| t.locale() == fallback))
        .or_else(|| translations.iter().min_by(|a, b| a.locale().cmp(b.locale())))
}

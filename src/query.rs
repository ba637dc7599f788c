//! Query parameters shared by the service layer and the stores.
//!
//! Everything here is a closed, validated value: sort fields and directions
//! are enums, text matches are normalized, pagination is clamped. Stores turn
//! these into SQL fragments or in-memory predicates and never see raw request
//! strings.

use crate::error::{ContentError, ContentResult};
use crate::i18n::Locale;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// ==================== Pagination ====================

/// Offset/limit window. `limit: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u32,
    pub limit: Option<u32>,
}

impl Pagination {
    /// Window from untrusted request values.
    ///
    /// Negative offsets become 0, a non-positive limit becomes
    /// `DEFAULT_PAGE_SIZE`, and limits above `MAX_PAGE_SIZE` are capped.
    pub fn clamped(offset: i64, limit: i64) -> Self {
        let offset = u32::try_from(offset.max(0)).unwrap_or(u32::MAX);
        let limit = if limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            u32::try_from(limit).unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE)
        };
        Self {
            offset,
            limit: Some(limit),
        }
    }

    /// First `limit` rows, with no upper cap applied.
    pub fn first(limit: u32) -> Self {
        Self {
            offset: 0,
            limit: Some(limit),
        }
    }

    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    /// Apply the window to an already-ordered sequence
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

// ==================== Text Matching ====================

/// Case-insensitive substring match against one locale's translation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    locale: String,
    needle: String,
}

impl TextMatch {
    /// Returns `None` for blank text: an empty query applies no predicate.
    pub fn new(locale: &Locale, text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            locale: locale.code().to_string(),
            needle: text.to_lowercase(),
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// `LIKE` pattern with wildcards on both ends; `%`, `_` and `\` in the
    /// user's text match literally.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for c in self.needle.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    pub fn matches_any(&self, fields: &[&str]) -> bool {
        fields.iter().any(|field| self.matches(field))
    }
}

// ==================== Sorting ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Manual catalog position (`sort_order` column)
    #[default]
    Position,
    /// Product name in the requested locale
    Name,
    CreatedAt,
}

impl SortField {
    /// Unknown values select the catalog position, as the public filter
    /// endpoint always has.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Self::Name,
            "created_at" => Self::CreatedAt,
            _ => Self::Position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only `asc` and `desc` (any case) are accepted; empty means `asc`.
    pub fn parse(value: &str) -> ContentResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ContentError::validation(format!(
                "sort_order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl ProductSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

// ==================== Filters ====================

/// Predicate shared by a product page fetch and its count query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub exclude_id: Option<i64>,
    pub text: Option<TextMatch>,
}

impl ProductFilter {
    /// Category id 0 means "all categories".
    pub fn in_category(category_id: i64) -> Self {
        Self {
            category_id: (category_id > 0).then_some(category_id),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: Option<TextMatch>) -> Self {
        self.text = text;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub sort: ProductSort,
    /// Locale whose translation drives name sorting
    pub locale: String,
}

impl ProductQuery {
    pub fn new(filter: ProductFilter, sort: ProductSort, locale: &Locale) -> Self {
        Self {
            filter,
            sort,
            locale: locale.code().to_string(),
        }
    }
}

/// Predicate for news, pages, documents and contacts.
///
/// `type_tag` applies to documents and contacts; news visibility is always
/// gated on `published` by the store regardless of this filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub type_tag: Option<String>,
    pub text: Option<TextMatch>,
}

impl ContentFilter {
    pub fn of_type(type_tag: Option<&str>) -> Self {
        Self {
            type_tag: type_tag
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            text: None,
        }
    }

    pub fn matching(text: Option<TextMatch>) -> Self {
        Self {
            type_tag: None,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn en() -> Locale {
        Locale::parse("en").unwrap()
    }

    // ==================== Pagination Tests ====================

    #[test]
    fn test_clamped_defaults() {
        assert_eq!(Pagination::clamped(0, 0), Pagination::first(DEFAULT_PAGE_SIZE));
        assert_eq!(Pagination::clamped(-5, -1).offset, 0);
        assert_eq!(Pagination::clamped(0, 10_000).limit, Some(MAX_PAGE_SIZE));
        assert_eq!(Pagination::clamped(20, 5), Pagination { offset: 20, limit: Some(5) });
    }

    #[test]
    fn test_window() {
        let page = Pagination { offset: 2, limit: Some(2) };
        assert_eq!(page.window(1..=10), vec![3, 4]);
        assert_eq!(Pagination::all().window(1..=3), vec![1, 2, 3]);
        assert!(Pagination { offset: 50, limit: Some(5) }.window(1..=3).is_empty());
    }

    proptest! {
        #[test]
        fn prop_clamped_limit_in_range(offset in any::<i64>(), limit in any::<i64>()) {
            let page = Pagination::clamped(offset, limit);
            let limit = page.limit.unwrap();
            prop_assert!((1..=MAX_PAGE_SIZE).contains(&limit));
        }

        #[test]
        fn prop_window_never_exceeds_limit(
            len in 0usize..200,
            offset in 0i64..300,
            limit in -5i64..150,
        ) {
            let page = Pagination::clamped(offset, limit);
            let items: Vec<usize> = (0..len).collect();
            let window = page.window(items.iter().copied());
            prop_assert!(window.len() <= page.limit.unwrap() as usize);
            if let Some(first) = window.first() {
                prop_assert_eq!(*first, offset as usize);
            }
        }
    }

    // ==================== TextMatch Tests ====================

    #[test]
    fn test_text_match_blank_is_none() {
        assert!(TextMatch::new(&en(), "").is_none());
        assert!(TextMatch::new(&en(), "   ").is_none());
    }

    #[test]
    fn test_text_match_case_insensitive() {
        let m = TextMatch::new(&en(), "BoLt").unwrap();
        assert!(m.matches("Hex bolt M8"));
        assert!(m.matches("BOLTS"));
        assert!(!m.matches("nut"));
        assert!(m.matches_any(&["nut", "washer", "anchor bolt"]));
    }

    #[test]
    fn test_text_match_cyrillic() {
        let m = TextMatch::new(&Locale::parse("ru").unwrap(), "БОЛТ").unwrap();
        assert!(m.matches("Болт анкерный"));
        assert_eq!(m.locale(), "ru");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let m = TextMatch::new(&en(), "50%_off\\").unwrap();
        assert_eq!(m.like_pattern(), "%50\\%\\_off\\\\%");
        assert_eq!(TextMatch::new(&en(), "Bolt").unwrap().like_pattern(), "%bolt%");
    }

    // ==================== Sorting Tests ====================

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(SortField::parse("name"), SortField::Name);
        assert_eq!(SortField::parse("created_at"), SortField::CreatedAt);
        assert_eq!(SortField::parse(""), SortField::Position);
        assert_eq!(SortField::parse("price; drop table"), SortField::Position);
    }

    #[test]
    fn test_sort_direction_allow_list() {
        assert_eq!(SortDirection::parse("asc").unwrap(), SortDirection::Asc);
        assert_eq!(SortDirection::parse("DESC").unwrap(), SortDirection::Desc);
        assert_eq!(SortDirection::parse("").unwrap(), SortDirection::Asc);
        assert!(matches!(
            SortDirection::parse("desc; DROP TABLE products"),
            Err(ContentError::Validation(_))
        ));
        assert!(SortDirection::parse("ascending").is_err());
    }

    #[test]
    fn test_sort_direction_apply() {
        assert_eq!(SortDirection::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }

    // ==================== Filter Tests ====================

    #[test]
    fn test_category_zero_is_unfiltered() {
        assert_eq!(ProductFilter::in_category(0).category_id, None);
        assert_eq!(ProductFilter::in_category(7).category_id, Some(7));
    }

    #[test]
    fn test_content_filter_blank_type() {
        assert_eq!(ContentFilter::of_type(Some("  ")).type_tag, None);
        assert_eq!(
            ContentFilter::of_type(Some("certificate")).type_tag.as_deref(),
            Some("certificate")
        );
        assert_eq!(ContentFilter::of_type(None), ContentFilter::default());
    }
}

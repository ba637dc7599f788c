//! Response records: one locale resolved, ready to serialize.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A page of results plus the total number of rows matching the same
/// predicate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageDto {
    pub id: i64,
    pub slug: String,
    pub template: String,
    pub title: String,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub product_count: u64,
    pub children: Vec<CategoryDto>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecDto {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductDto {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub category_id: i64,
    pub category_name: String,
    pub image_url: String,
    pub file_url: String,
    pub specs: Vec<SpecDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewsDto {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub file_url: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactDto {
    pub id: i64,
    #[serde(rename = "type")]
    pub contact_type: String,
    pub label: String,
    pub value: String,
}

/// `GET /{locale}/products/{slug}` body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryListing {
    pub category: CategoryDto,
    pub items: Vec<ProductDto>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Product,
    News,
    Page,
    Document,
}

/// One hit of the cross-type search, uniform across content types.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// A section of a composite read that failed and was left out.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionFailure {
    pub section: &'static str,
    pub message: String,
}

impl SectionFailure {
    pub fn new(section: &'static str, error: &impl std::fmt::Display) -> Self {
        Self {
            section,
            message: error.to_string(),
        }
    }
}

/// Outcome of a composite read: whatever could be assembled, plus the
/// sections that were skipped because their query failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial<T> {
    pub value: T,
    pub failures: Vec<SectionFailure>,
}

impl<T> Partial<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeedbackReceipt {
    pub id: i64,
}

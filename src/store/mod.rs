//! Persistence contract consumed by the service layer.
//!
//! A store answers fetch-by-key, fetch-list-with-predicate-and-pagination,
//! count-with-predicate and insert-row queries. It returns entities with all
//! of their translations loaded; picking a locale is the caller's job.
//!
//! For every list operation the paired `count_*` must apply exactly the same
//! predicate as the page fetch. No snapshot is shared between the two calls.

mod memory;
mod postgres;

pub use memory::{MemoryContentStore, StoreSection};
pub use postgres::PgContentStore;

use crate::models::{
    Category, Contact, Document, NewCategory, NewFeedback, News, Page, Product,
};
use crate::query::{ContentFilter, Pagination, ProductFilter, ProductQuery};
use async_trait::async_trait;

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait ContentStore: Send + Sync {
    // Pages: newest first
    async fn pages(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<Page>>;
    async fn count_pages(&self, filter: &ContentFilter) -> StoreResult<u64>;
    async fn page_by_id(&self, id: i64) -> StoreResult<Option<Page>>;
    async fn page_by_slug(&self, slug: &str) -> StoreResult<Option<Page>>;

    // Categories: each returned category carries one level of children
    async fn root_categories(&self) -> StoreResult<Vec<Category>>;
    async fn category_by_id(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>>;
    /// Fails when the slug is already taken
    async fn insert_category(&self, category: &NewCategory) -> StoreResult<i64>;

    // Products
    async fn products(&self, query: &ProductQuery, page: Pagination) -> StoreResult<Vec<Product>>;
    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<u64>;
    async fn product_by_id(&self, id: i64) -> StoreResult<Option<Product>>;

    // News: published only, newest first
    async fn news(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<News>>;
    async fn count_news(&self, filter: &ContentFilter) -> StoreResult<u64>;
    async fn published_news_by_id(&self, id: i64) -> StoreResult<Option<News>>;

    // Documents: newest first
    async fn documents(
        &self,
        filter: &ContentFilter,
        page: Pagination,
    ) -> StoreResult<Vec<Document>>;
    async fn count_documents(&self, filter: &ContentFilter) -> StoreResult<u64>;
    async fn document_by_id(&self, id: i64) -> StoreResult<Option<Document>>;

    // Contacts: by sort order
    async fn contacts(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<Contact>>;
    async fn count_contacts(&self, filter: &ContentFilter) -> StoreResult<u64>;
    async fn contact_by_id(&self, id: i64) -> StoreResult<Option<Contact>>;

    // Feedback
    async fn insert_feedback(&self, feedback: &NewFeedback) -> StoreResult<i64>;
}

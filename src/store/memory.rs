//! In-process content store.
//!
//! Mirrors the Postgres store's predicates and orderings over plain vectors.
//! Used to run the site without a database and by the test suites, which can
//! also make individual sections fail to exercise partial-result handling.

use super::{ContentStore, StoreResult};
use crate::i18n::Translation;
use crate::models::{
    Category, Contact, Document, NewCategory, NewFeedback, News, Page, Product,
};
use crate::query::{ContentFilter, Pagination, ProductFilter, ProductQuery, SortField, TextMatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Storage areas that can be made to fail on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreSection {
    Pages,
    Categories,
    Products,
    News,
    Documents,
    Contacts,
    Feedback,
}

#[derive(Debug, Default)]
struct Tables {
    pages: Vec<Page>,
    categories: Vec<Category>,
    products: Vec<Product>,
    news: Vec<News>,
    documents: Vec<Document>,
    contacts: Vec<Contact>,
    feedback: Vec<(i64, NewFeedback)>,
    failing: HashSet<StoreSection>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, page: Page) -> &Self {
        self.write().pages.push(page);
        self
    }

    /// Categories are stored flat; children are assembled on read
    pub fn add_category(&self, category: Category) -> &Self {
        self.write().categories.push(category);
        self
    }

    /// Category names are attached on read from the stored categories
    pub fn add_product(&self, product: Product) -> &Self {
        self.write().products.push(product);
        self
    }

    pub fn add_news(&self, news: News) -> &Self {
        self.write().news.push(news);
        self
    }

    pub fn add_document(&self, document: Document) -> &Self {
        self.write().documents.push(document);
        self
    }

    pub fn add_contact(&self, contact: Contact) -> &Self {
        self.write().contacts.push(contact);
        self
    }

    /// Make every query touching `section` fail with a storage error
    pub fn fail_section(&self, section: StoreSection) -> &Self {
        self.write().failing.insert(section);
        self
    }

    pub fn restore_section(&self, section: StoreSection) -> &Self {
        self.write().failing.remove(&section);
        self
    }

    /// Stored feedback rows, in insertion order
    pub fn feedback(&self) -> Vec<(i64, NewFeedback)> {
        self.read().feedback.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn guard(&self, section: StoreSection) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        let tables = self.read();
        if tables.failing.contains(&section) {
            return Err(sqlx::Error::Protocol(format!(
                "{:?} storage unavailable",
                section
            )));
        }
        Ok(tables)
    }
}

// ==================== Predicates ====================

/// True when `translations` has an entry in the match locale whose text
/// fields contain the needle. No text match means everything passes.
fn text_matches<T: Translation>(
    text: Option<&TextMatch>,
    translations: &[T],
    fields: impl Fn(&T) -> Vec<&str>,
) -> bool {
    match text {
        None => true,
        Some(m) => translations
            .iter()
            .filter(|t| t.locale() == m.locale())
            .any(|t| m.matches_any(&fields(t))),
    }
}

fn type_matches(filter: &ContentFilter, type_tag: &str) -> bool {
    filter.type_tag.as_deref().map_or(true, |wanted| wanted == type_tag)
}

fn product_matches(filter: &ProductFilter, product: &Product) -> bool {
    filter.category_id.map_or(true, |id| product.category_id == id)
        && filter.exclude_id.map_or(true, |id| product.id != id)
        && text_matches(filter.text.as_ref(), &product.translations, |t| {
            vec![t.name.as_str(), t.description.as_str(), t.short_description.as_str()]
        })
}

fn page_matches(filter: &ContentFilter, page: &Page) -> bool {
    text_matches(filter.text.as_ref(), &page.translations, |t| {
        vec![t.title.as_str(), t.content.as_str()]
    })
}

fn news_matches(filter: &ContentFilter, news: &News) -> bool {
    news.published
        && text_matches(filter.text.as_ref(), &news.translations, |t| {
            vec![t.title.as_str(), t.content.as_str(), t.excerpt.as_str()]
        })
}

fn document_matches(filter: &ContentFilter, document: &Document) -> bool {
    type_matches(filter, &document.doc_type)
        && text_matches(filter.text.as_ref(), &document.translations, |t| {
            vec![t.title.as_str(), t.description.as_str()]
        })
}

fn contact_matches(filter: &ContentFilter, contact: &Contact) -> bool {
    type_matches(filter, &contact.contact_type)
        && text_matches(filter.text.as_ref(), &contact.translations, |t| vec![t.label.as_str()])
}

fn sorted_translations<T: Translation + Clone>(translations: &[T]) -> Vec<T> {
    let mut sorted = translations.to_vec();
    sorted.sort_by(|a, b| a.locale().cmp(b.locale()));
    sorted
}

// ==================== Ordering ====================

/// Name of the product in `locale`; missing names sort like SQL NULLs
/// (greater than any value).
fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn product_name<'a>(product: &'a Product, locale: &str) -> Option<&'a str> {
    product
        .translations
        .iter()
        .find(|t| t.locale == locale)
        .map(|t| t.name.as_str())
}

fn order_products(products: &mut [Product], query: &ProductQuery) {
    let direction = query.sort.direction;
    products.sort_by(|a, b| {
        let primary = match query.sort.field {
            SortField::Name => direction.apply(compare_names(
                product_name(a, &query.locale),
                product_name(b, &query.locale),
            )),
            SortField::CreatedAt => direction.apply(a.created_at.cmp(&b.created_at)),
            SortField::Position => direction
                .apply(a.sort_order.cmp(&b.sort_order))
                .then_with(|| b.created_at.cmp(&a.created_at)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

impl Tables {
    fn children_of(&self, parent_id: i64) -> Vec<Category> {
        let mut children: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .map(|c| Category {
                translations: sorted_translations(&c.translations),
                children: Vec::new(),
                ..c.clone()
            })
            .collect();
        children.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        children
    }

    fn with_children(&self, category: &Category) -> Category {
        Category {
            translations: sorted_translations(&category.translations),
            children: self.children_of(category.id),
            ..category.clone()
        }
    }

    fn hydrate_product(&self, product: &Product) -> Product {
        let mut specs = product.specs.clone();
        specs.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        for spec in &mut specs {
            spec.translations = sorted_translations(&spec.translations);
        }
        Product {
            translations: sorted_translations(&product.translations),
            specs,
            category_translations: self
                .categories
                .iter()
                .find(|c| c.id == product.category_id)
                .map(|c| sorted_translations(&c.translations))
                .unwrap_or_default(),
            ..product.clone()
        }
    }
}

fn hydrate_page(page: &Page) -> Page {
    Page {
        translations: sorted_translations(&page.translations),
        ..page.clone()
    }
}

fn hydrate_news(news: &News) -> News {
    News {
        translations: sorted_translations(&news.translations),
        ..news.clone()
    }
}

fn hydrate_document(document: &Document) -> Document {
    Document {
        translations: sorted_translations(&document.translations),
        ..document.clone()
    }
}

fn hydrate_contact(contact: &Contact) -> Contact {
    Contact {
        translations: sorted_translations(&contact.translations),
        ..contact.clone()
    }
}

fn count<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| predicate(item)).count() as u64
}

/// `created_at DESC, id DESC`
fn newest_first(a: (DateTime<Utc>, i64), b: (DateTime<Utc>, i64)) -> Ordering {
    b.cmp(&a)
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn pages(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<Page>> {
        let tables = self.guard(StoreSection::Pages)?;
        let mut pages: Vec<Page> = tables
            .pages
            .iter()
            .filter(|p| page_matches(filter, p))
            .map(hydrate_page)
            .collect();
        pages.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));
        Ok(page.window(pages))
    }

    async fn count_pages(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let tables = self.guard(StoreSection::Pages)?;
        Ok(count(&tables.pages, |p| page_matches(filter, p)))
    }

    async fn page_by_id(&self, id: i64) -> StoreResult<Option<Page>> {
        let tables = self.guard(StoreSection::Pages)?;
        Ok(tables.pages.iter().find(|p| p.id == id).map(hydrate_page))
    }

    async fn page_by_slug(&self, slug: &str) -> StoreResult<Option<Page>> {
        let tables = self.guard(StoreSection::Pages)?;
        Ok(tables.pages.iter().find(|p| p.slug == slug).map(hydrate_page))
    }

    async fn root_categories(&self) -> StoreResult<Vec<Category>> {
        let tables = self.guard(StoreSection::Categories)?;
        let mut roots: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.parent_id.is_none())
            .map(|c| tables.with_children(c))
            .collect();
        roots.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(roots)
    }

    async fn category_by_id(&self, id: i64) -> StoreResult<Option<Category>> {
        let tables = self.guard(StoreSection::Categories)?;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| tables.with_children(c)))
    }

    async fn category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        let tables = self.guard(StoreSection::Categories)?;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .map(|c| tables.with_children(c)))
    }

    async fn insert_category(&self, category: &NewCategory) -> StoreResult<i64> {
        if self.read().failing.contains(&StoreSection::Categories) {
            return Err(sqlx::Error::Protocol("Categories storage unavailable".to_string()));
        }
        let mut tables = self.write();
        if tables.categories.iter().any(|c| c.slug == category.slug) {
            return Err(sqlx::Error::Protocol(format!(
                "duplicate category slug '{}'",
                category.slug
            )));
        }
        let id = tables.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        tables.categories.push(Category {
            id,
            parent_id: category.parent_id,
            slug: category.slug.clone(),
            sort_order: category.sort_order,
            created_at: category.created_at,
            translations: category.translations.clone(),
            children: Vec::new(),
        });
        Ok(id)
    }

    async fn products(&self, query: &ProductQuery, page: Pagination) -> StoreResult<Vec<Product>> {
        let tables = self.guard(StoreSection::Products)?;
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| product_matches(&query.filter, p))
            .map(|p| tables.hydrate_product(p))
            .collect();
        order_products(&mut products, query);
        Ok(page.window(products))
    }

    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let tables = self.guard(StoreSection::Products)?;
        Ok(count(&tables.products, |p| product_matches(filter, p)))
    }

    async fn product_by_id(&self, id: i64) -> StoreResult<Option<Product>> {
        let tables = self.guard(StoreSection::Products)?;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.hydrate_product(p)))
    }

    async fn news(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<News>> {
        let tables = self.guard(StoreSection::News)?;
        let mut items: Vec<News> = tables
            .news
            .iter()
            .filter(|n| news_matches(filter, n))
            .map(hydrate_news)
            .collect();
        items.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));
        Ok(page.window(items))
    }

    async fn count_news(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let tables = self.guard(StoreSection::News)?;
        Ok(count(&tables.news, |n| news_matches(filter, n)))
    }

    async fn published_news_by_id(&self, id: i64) -> StoreResult<Option<News>> {
        let tables = self.guard(StoreSection::News)?;
        Ok(tables
            .news
            .iter()
            .find(|n| n.id == id && n.published)
            .map(hydrate_news))
    }

    async fn documents(
        &self,
        filter: &ContentFilter,
        page: Pagination,
    ) -> StoreResult<Vec<Document>> {
        let tables = self.guard(StoreSection::Documents)?;
        let mut documents: Vec<Document> = tables
            .documents
            .iter()
            .filter(|d| document_matches(filter, d))
            .map(hydrate_document)
            .collect();
        documents.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));
        Ok(page.window(documents))
    }

    async fn count_documents(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let tables = self.guard(StoreSection::Documents)?;
        Ok(count(&tables.documents, |d| document_matches(filter, d)))
    }

    async fn document_by_id(&self, id: i64) -> StoreResult<Option<Document>> {
        let tables = self.guard(StoreSection::Documents)?;
        Ok(tables
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(hydrate_document))
    }

    async fn contacts(
        &self,
        filter: &ContentFilter,
        page: Pagination,
    ) -> StoreResult<Vec<Contact>> {
        let tables = self.guard(StoreSection::Contacts)?;
        let mut contacts: Vec<Contact> = tables
            .contacts
            .iter()
            .filter(|c| contact_matches(filter, c))
            .map(hydrate_contact)
            .collect();
        contacts.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(page.window(contacts))
    }

    async fn count_contacts(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let tables = self.guard(StoreSection::Contacts)?;
        Ok(count(&tables.contacts, |c| contact_matches(filter, c)))
    }

    async fn contact_by_id(&self, id: i64) -> StoreResult<Option<Contact>> {
        let tables = self.guard(StoreSection::Contacts)?;
        Ok(tables
            .contacts
            .iter()
            .find(|c| c.id == id)
            .map(hydrate_contact))
    }

    async fn insert_feedback(&self, feedback: &NewFeedback) -> StoreResult<i64> {
        if self.read().failing.contains(&StoreSection::Feedback) {
            return Err(sqlx::Error::Protocol("Feedback storage unavailable".to_string()));
        }
        let mut tables = self.write();
        let id = tables.feedback.len() as i64 + 1;
        tables.feedback.push((id, feedback.clone()));
        Ok(id)
    }
}

//! Catalog queries: paginated listings, lookups, substring search and the
//! product filter, for products, news, pages, documents and contacts.
//!
//! Every listing fetches its page and its total with the same filter value,
//! so the two queries share one predicate.

use crate::dto::{
    CategoryListing, ContactDto, DocumentDto, Listing, NewsDto, PageDto, ProductDto, SpecDto,
};
use crate::error::{ContentError, ContentResult};
use crate::i18n::Locale;
use crate::models::{Contact, Document, News, Page, Product};
use crate::query::{
    ContentFilter, Pagination, ProductFilter, ProductQuery, ProductSort, SortDirection, SortField,
    TextMatch,
};
use crate::service::SiteService;
use tracing::debug;

/// Raw product filter parameters as they arrive from a request.
#[derive(Debug, Clone, Default)]
pub struct ProductFilterParams {
    /// 0 means all categories
    pub category_id: i64,
    pub search: String,
    pub sort_by: String,
    pub sort_order: String,
}

impl SiteService {
    // ==================== Products ====================

    pub async fn list_products(
        &self,
        locale: &Locale,
        page: Pagination,
    ) -> ContentResult<Listing<ProductDto>> {
        self.product_listing(locale, ProductFilter::default(), ProductSort::default(), page)
            .await
    }

    pub async fn products_in_category(
        &self,
        locale: &Locale,
        category_id: i64,
        page: Pagination,
    ) -> ContentResult<Listing<ProductDto>> {
        self.product_listing(
            locale,
            ProductFilter::in_category(category_id),
            ProductSort::default(),
            page,
        )
        .await
    }

    /// Products of the category with this slug, along with the category.
    pub async fn products_by_category_slug(
        &self,
        locale: &Locale,
        slug: &str,
        page: Pagination,
    ) -> ContentResult<CategoryListing> {
        let category = self.category_by_slug(slug, locale).await?;
        let listing = self.products_in_category(locale, category.id, page).await?;
        Ok(CategoryListing {
            category,
            items: listing.items,
            total: listing.total,
        })
    }

    pub async fn product(&self, locale: &Locale, id: i64) -> ContentResult<ProductDto> {
        let product = self
            .store()
            .product_by_id(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("product {}", id)))?;
        Ok(self.product_dto(&product, locale))
    }

    /// Other products from the same category, in catalog order.
    pub async fn related_products(
        &self,
        locale: &Locale,
        product_id: i64,
        limit: u32,
    ) -> ContentResult<Vec<ProductDto>> {
        let product = self
            .store()
            .product_by_id(product_id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("product {}", product_id)))?;

        let filter = ProductFilter {
            category_id: Some(product.category_id),
            exclude_id: Some(product.id),
            text: None,
        };
        let query = ProductQuery::new(filter, ProductSort::default(), locale);
        let related = self.store().products(&query, Pagination::first(limit)).await?;
        Ok(related.iter().map(|p| self.product_dto(p, locale)).collect())
    }

    /// Case-insensitive substring search over the locale's name and
    /// descriptions. Blank text lists everything.
    pub async fn search_products(
        &self,
        locale: &Locale,
        text: &str,
        page: Pagination,
    ) -> ContentResult<Listing<ProductDto>> {
        let filter = ProductFilter::default().with_text(TextMatch::new(locale, text));
        self.product_listing(locale, filter, ProductSort::default(), page)
            .await
    }

    /// Category scope, text narrowing and a validated sort in one query.
    ///
    /// `sort_order` must be `asc` or `desc`; anything else is rejected before
    /// the store is consulted.
    pub async fn filter_products(
        &self,
        locale: &Locale,
        params: &ProductFilterParams,
        page: Pagination,
    ) -> ContentResult<Listing<ProductDto>> {
        let sort = ProductSort::new(
            SortField::parse(&params.sort_by),
            SortDirection::parse(&params.sort_order)?,
        );
        let filter = ProductFilter::in_category(params.category_id)
            .with_text(TextMatch::new(locale, &params.search));
        self.product_listing(locale, filter, sort, page).await
    }

    async fn product_listing(
        &self,
        locale: &Locale,
        filter: ProductFilter,
        sort: ProductSort,
        page: Pagination,
    ) -> ContentResult<Listing<ProductDto>> {
        let query = ProductQuery::new(filter, sort, locale);
        let (products, total) = futures::try_join!(
            self.store().products(&query, page),
            self.store().count_products(&query.filter),
        )?;
        debug!(
            "Product listing: {} of {} (offset {})",
            products.len(),
            total,
            page.offset
        );
        let items = products.iter().map(|p| self.product_dto(p, locale)).collect();
        Ok(Listing::new(items, total))
    }

    pub(crate) fn product_dto(&self, product: &Product, locale: &Locale) -> ProductDto {
        let translation = self.pick(&product.translations, locale);
        ProductDto {
            id: product.id,
            sku: product.sku.clone(),
            name: translation.map(|t| t.name.clone()).unwrap_or_default(),
            short_description: translation
                .map(|t| t.short_description.clone())
                .unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            category_id: product.category_id,
            category_name: self.text(&product.category_translations, locale, |t| {
                t.name.as_str()
            }),
            image_url: product.image_url.clone(),
            file_url: product.file_url.clone(),
            specs: product
                .specs
                .iter()
                .map(|spec| {
                    let t = self.pick(&spec.translations, locale);
                    SpecDto {
                        name: t.map(|t| t.name.clone()).unwrap_or_default(),
                        value: t.map(|t| t.value.clone()).unwrap_or_default(),
                    }
                })
                .collect(),
            created_at: product.created_at,
        }
    }

    // ==================== News ====================

    /// Published news, newest first.
    pub async fn list_news(
        &self,
        locale: &Locale,
        page: Pagination,
    ) -> ContentResult<Listing<NewsDto>> {
        self.news_listing(locale, ContentFilter::default(), page).await
    }

    pub async fn search_news(
        &self,
        locale: &Locale,
        text: &str,
        page: Pagination,
    ) -> ContentResult<Listing<NewsDto>> {
        let filter = ContentFilter::matching(TextMatch::new(locale, text));
        self.news_listing(locale, filter, page).await
    }

    pub async fn recent_news(&self, locale: &Locale, limit: u32) -> ContentResult<Vec<NewsDto>> {
        let news = self
            .store()
            .news(&ContentFilter::default(), Pagination::first(limit))
            .await?;
        Ok(news.iter().map(|n| self.news_dto(n, locale)).collect())
    }

    /// Unpublished items are reported as missing.
    pub async fn news_item(&self, locale: &Locale, id: i64) -> ContentResult<NewsDto> {
        let news = self
            .store()
            .published_news_by_id(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("news {}", id)))?;
        Ok(self.news_dto(&news, locale))
    }

    async fn news_listing(
        &self,
        locale: &Locale,
        filter: ContentFilter,
        page: Pagination,
    ) -> ContentResult<Listing<NewsDto>> {
        let (news, total) = futures::try_join!(
            self.store().news(&filter, page),
            self.store().count_news(&filter),
        )?;
        let items = news.iter().map(|n| self.news_dto(n, locale)).collect();
        Ok(Listing::new(items, total))
    }

    pub(crate) fn news_dto(&self, news: &News, locale: &Locale) -> NewsDto {
        let translation = self.pick(&news.translations, locale);
        NewsDto {
            id: news.id,
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            excerpt: translation.map(|t| t.excerpt.clone()).unwrap_or_default(),
            content: translation.map(|t| t.content.clone()).unwrap_or_default(),
            image_url: news.image_url.clone(),
            created_at: news.created_at,
        }
    }

    // ==================== Pages ====================

    pub async fn list_pages(
        &self,
        locale: &Locale,
        page: Pagination,
    ) -> ContentResult<Listing<PageDto>> {
        self.page_listing(locale, ContentFilter::default(), page).await
    }

    pub async fn search_pages(
        &self,
        locale: &Locale,
        text: &str,
        page: Pagination,
    ) -> ContentResult<Listing<PageDto>> {
        let filter = ContentFilter::matching(TextMatch::new(locale, text));
        self.page_listing(locale, filter, page).await
    }

    pub async fn page(&self, locale: &Locale, id: i64) -> ContentResult<PageDto> {
        let page = self
            .store()
            .page_by_id(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("page {}", id)))?;
        Ok(self.page_dto(&page, locale))
    }

    pub async fn page_by_slug(&self, locale: &Locale, slug: &str) -> ContentResult<PageDto> {
        let page = self
            .store()
            .page_by_slug(slug)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("page '{}'", slug)))?;
        Ok(self.page_dto(&page, locale))
    }

    async fn page_listing(
        &self,
        locale: &Locale,
        filter: ContentFilter,
        page: Pagination,
    ) -> ContentResult<Listing<PageDto>> {
        let (pages, total) = futures::try_join!(
            self.store().pages(&filter, page),
            self.store().count_pages(&filter),
        )?;
        let items = pages.iter().map(|p| self.page_dto(p, locale)).collect();
        Ok(Listing::new(items, total))
    }

    fn page_dto(&self, page: &Page, locale: &Locale) -> PageDto {
        let translation = self.pick(&page.translations, locale);
        PageDto {
            id: page.id,
            slug: page.slug.clone(),
            template: page.template.clone(),
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            content: translation.map(|t| t.content.clone()).unwrap_or_default(),
            meta_title: translation.map(|t| t.meta_title.clone()).unwrap_or_default(),
            meta_description: translation
                .map(|t| t.meta_description.clone())
                .unwrap_or_default(),
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }

    // ==================== Documents ====================

    pub async fn list_documents(
        &self,
        locale: &Locale,
        page: Pagination,
    ) -> ContentResult<Listing<DocumentDto>> {
        self.document_listing(locale, ContentFilter::default(), page)
            .await
    }

    /// All documents with the type tag; a blank tag lists every type.
    pub async fn documents_by_type(
        &self,
        locale: &Locale,
        doc_type: &str,
    ) -> ContentResult<Vec<DocumentDto>> {
        let listing = self
            .document_listing(
                locale,
                ContentFilter::of_type(Some(doc_type)),
                Pagination::all(),
            )
            .await?;
        Ok(listing.items)
    }

    pub async fn search_documents(
        &self,
        locale: &Locale,
        text: &str,
        page: Pagination,
    ) -> ContentResult<Listing<DocumentDto>> {
        let filter = ContentFilter::matching(TextMatch::new(locale, text));
        self.document_listing(locale, filter, page).await
    }

    pub async fn document(&self, locale: &Locale, id: i64) -> ContentResult<DocumentDto> {
        let document = self
            .store()
            .document_by_id(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("document {}", id)))?;
        Ok(self.document_dto(&document, locale))
    }

    async fn document_listing(
        &self,
        locale: &Locale,
        filter: ContentFilter,
        page: Pagination,
    ) -> ContentResult<Listing<DocumentDto>> {
        let (documents, total) = futures::try_join!(
            self.store().documents(&filter, page),
            self.store().count_documents(&filter),
        )?;
        let items = documents
            .iter()
            .map(|d| self.document_dto(d, locale))
            .collect();
        Ok(Listing::new(items, total))
    }

    fn document_dto(&self, document: &Document, locale: &Locale) -> DocumentDto {
        let translation = self.pick(&document.translations, locale);
        DocumentDto {
            id: document.id,
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            file_url: document.file_url.clone(),
            doc_type: document.doc_type.clone(),
            created_at: document.created_at,
        }
    }

    // ==================== Contacts ====================

    pub async fn list_contacts(
        &self,
        locale: &Locale,
        page: Pagination,
    ) -> ContentResult<Listing<ContactDto>> {
        self.contact_listing(locale, ContentFilter::default(), page)
            .await
    }

    /// All contacts with the type tag, by sort order; a blank tag lists
    /// every type.
    pub async fn contacts_by_type(
        &self,
        locale: &Locale,
        contact_type: &str,
    ) -> ContentResult<Vec<ContactDto>> {
        let listing = self
            .contact_listing(
                locale,
                ContentFilter::of_type(Some(contact_type)),
                Pagination::all(),
            )
            .await?;
        Ok(listing.items)
    }

    pub async fn contact(&self, locale: &Locale, id: i64) -> ContentResult<ContactDto> {
        let contact = self
            .store()
            .contact_by_id(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("contact {}", id)))?;
        Ok(self.contact_dto(&contact, locale))
    }

    async fn contact_listing(
        &self,
        locale: &Locale,
        filter: ContentFilter,
        page: Pagination,
    ) -> ContentResult<Listing<ContactDto>> {
        let (contacts, total) = futures::try_join!(
            self.store().contacts(&filter, page),
            self.store().count_contacts(&filter),
        )?;
        let items = contacts.iter().map(|c| self.contact_dto(c, locale)).collect();
        Ok(Listing::new(items, total))
    }

    fn contact_dto(&self, contact: &Contact, locale: &Locale) -> ContactDto {
        ContactDto {
            id: contact.id,
            contact_type: contact.contact_type.clone(),
            label: self.text(&contact.translations, locale, |t| t.label.as_str()),
            value: contact.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Category, ProductSpec};
    use crate::store::{MemoryContentStore, StoreSection};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn locale(code: &str) -> Locale {
        Locale::parse(code).unwrap()
    }

    fn service(store: &MemoryContentStore) -> SiteService {
        SiteService::new(Arc::new(store.clone()), Config::for_site("http://example.test"))
    }

    fn catalog() -> MemoryContentStore {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let store = MemoryContentStore::new();
        store
            .add_category(
                Category::new(1, "fasteners")
                    .with_translation("en", "Fasteners", "")
                    .with_translation("ru", "Крепёж", ""),
            )
            .add_category(Category::new(2, "tools").with_translation("en", "Tools", ""));
        for i in 1..=12 {
            let category = if i <= 8 { 1 } else { 2 };
            store.add_product(
                Product::new(i, category, &format!("SKU-{:02}", i))
                    .with_translation("en", &format!("Item {:02}", i), "", "")
                    .with_sort_order(i as i32)
                    .created_at(base + Duration::hours(i)),
            );
        }
        store
    }

    // ==================== Product Tests ====================

    #[tokio::test]
    async fn test_widget_fallback_for_unknown_locale() {
        let store = MemoryContentStore::new();
        store.add_product(
            Product::new(1, 1, "W-1")
                .with_translation("ru", "Виджет", "", "")
                .with_translation("en", "Widget", "", ""),
        );
        let product = service(&store).product(&locale("fr"), 1).await.unwrap();
        assert_eq!(product.name, "Widget");
    }

    #[tokio::test]
    async fn test_product_detail_resolves_category_and_specs() {
        let store = catalog();
        store.add_product(
            Product::new(50, 1, "HB-8")
                .with_translation("ru", "Болт", "", "")
                .with_spec(ProductSpec::new(2, 50, 2).with_translation("ru", "Длина", "40"))
                .with_spec(
                    ProductSpec::new(1, 50, 1).with_translation("ru", "Диаметр", "M8"),
                ),
        );
        let product = service(&store).product(&locale("ru"), 50).await.unwrap();
        assert_eq!(product.category_name, "Крепёж");
        let specs: Vec<&str> = product.specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(specs, vec!["Диаметр", "Длина"]);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let store = catalog();
        assert!(matches!(
            service(&store).product(&locale("en"), 404).await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_window_and_total() {
        let store = catalog();
        let listing = service(&store)
            .list_products(&locale("en"), Pagination::clamped(10, 5))
            .await
            .unwrap();
        assert_eq!(listing.total, 12);
        let ids: Vec<i64> = listing.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_filter_category_zero_is_everything() {
        let store = catalog();
        let service = service(&store);
        let all = service
            .filter_products(
                &locale("en"),
                &ProductFilterParams::default(),
                Pagination::default(),
            )
            .await
            .unwrap();
        let tools = service
            .filter_products(
                &locale("en"),
                &ProductFilterParams {
                    category_id: 2,
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(all.total, 12);
        assert_eq!(tools.total, 4);
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_sort_order() {
        let store = catalog();
        store.fail_section(StoreSection::Products);
        let params = ProductFilterParams {
            sort_by: "name".to_string(),
            sort_order: "desc; drop table products".to_string(),
            ..Default::default()
        };
        // Validation happens before the (failing) store is reached
        assert!(matches!(
            service(&store)
                .filter_products(&locale("en"), &params, Pagination::default())
                .await,
            Err(ContentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_sort_by_name_desc_with_search() {
        let store = catalog();
        let params = ProductFilterParams {
            category_id: 1,
            search: "ITEM 0".to_string(),
            sort_by: "name".to_string(),
            sort_order: "DESC".to_string(),
        };
        let listing = service(&store)
            .filter_products(&locale("en"), &params, Pagination::clamped(0, 3))
            .await
            .unwrap();
        assert_eq!(listing.total, 8);
        let names: Vec<&str> = listing.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Item 08", "Item 07", "Item 06"]);
    }

    #[tokio::test]
    async fn test_products_by_category_slug() {
        let store = catalog();
        let service = service(&store);
        let listing = service
            .products_by_category_slug(&locale("en"), "tools", Pagination::default())
            .await
            .unwrap();
        assert_eq!(listing.category.name, "Tools");
        assert_eq!(listing.total, 4);

        assert!(matches!(
            service
                .products_by_category_slug(&locale("en"), "missing", Pagination::default())
                .await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_related_products_exclude_self() {
        let store = catalog();
        let related = service(&store)
            .related_products(&locale("en"), 9, 10)
            .await
            .unwrap();
        let ids: Vec<i64> = related.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_search_blank_matches_everything() {
        let store = catalog();
        let listing = service(&store)
            .search_products(&locale("en"), "  ", Pagination::default())
            .await
            .unwrap();
        assert_eq!(listing.total, 12);
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let store = catalog();
        store.fail_section(StoreSection::Products);
        assert!(matches!(
            service(&store)
                .list_products(&locale("en"), Pagination::default())
                .await,
            Err(ContentError::Storage(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_total_independent_of_window(offset in -3i64..20, limit in -3i64..20) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = catalog();
            let page = Pagination::clamped(offset, limit);
            let listing = runtime
                .block_on(service(&store).list_products(&locale("en"), page))
                .unwrap();
            prop_assert_eq!(listing.total, 12);
            prop_assert!(listing.items.len() <= page.limit.unwrap() as usize);
            if let Some(first) = listing.items.first() {
                // catalog order is sort_order ascending == id ascending here
                prop_assert_eq!(first.id, page.offset as i64 + 1);
            }
        }
    }

    // ==================== News Tests ====================

    fn newsroom() -> MemoryContentStore {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let store = MemoryContentStore::new();
        store
            .add_news(
                News::new(1, true)
                    .with_translation("en", "Old", "", "")
                    .created_at(base),
            )
            .add_news(
                News::new(2, false)
                    .with_translation("en", "Draft", "", "")
                    .created_at(base + Duration::days(2)),
            )
            .add_news(
                News::new(3, true)
                    .with_translation("en", "New", "", "")
                    .created_at(base + Duration::days(1)),
            );
        store
    }

    #[tokio::test]
    async fn test_news_published_only_newest_first() {
        let store = newsroom();
        let listing = service(&store)
            .list_news(&locale("en"), Pagination::default())
            .await
            .unwrap();
        assert_eq!(listing.total, 2);
        let titles: Vec<&str> = listing.items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_unpublished_news_is_not_found() {
        let store = newsroom();
        let service = service(&store);
        assert!(service.news_item(&locale("en"), 1).await.is_ok());
        assert!(matches!(
            service.news_item(&locale("en"), 2).await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_recent_news_limit() {
        let store = newsroom();
        let recent = service(&store).recent_news(&locale("en"), 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, 3);
    }

    // ==================== Pages, Documents, Contacts Tests ====================

    #[tokio::test]
    async fn test_page_by_slug() {
        let store = MemoryContentStore::new();
        store.add_page(Page::new(1, "about").with_translation("en", "About us", "Since 1999"));
        let service = service(&store);
        let page = service.page_by_slug(&locale("ru"), "about").await.unwrap();
        assert_eq!(page.title, "About us");
        assert!(matches!(
            service.page_by_slug(&locale("en"), "privacy").await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_documents_by_type() {
        let store = MemoryContentStore::new();
        store
            .add_document(
                Document::new(1, "certificate", "/f/iso.pdf").with_translation("en", "ISO", ""),
            )
            .add_document(
                Document::new(2, "reference", "/f/ref.pdf").with_translation("en", "Ref", ""),
            );
        let service = service(&store);
        let certificates = service
            .documents_by_type(&locale("en"), "certificate")
            .await
            .unwrap();
        assert_eq!(certificates.len(), 1);
        assert_eq!(certificates[0].doc_type, "certificate");
        assert_eq!(service.documents_by_type(&locale("en"), "").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_contacts_by_type_in_sort_order() {
        let store = MemoryContentStore::new();
        store
            .add_contact(
                Contact::new(1, "phone", "+1 555 0101")
                    .with_sort_order(2)
                    .with_label("en", "Sales"),
            )
            .add_contact(
                Contact::new(2, "phone", "+1 555 0100")
                    .with_sort_order(1)
                    .with_label("en", "Office"),
            )
            .add_contact(Contact::new(3, "email", "info@example.test").with_label("en", "Mail"));
        let phones = service(&store)
            .contacts_by_type(&locale("en"), "phone")
            .await
            .unwrap();
        let labels: Vec<&str> = phones.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Office", "Sales"]);
    }

    #[tokio::test]
    async fn test_search_news_skips_unpublished() {
        let store = newsroom();
        let service = service(&store);
        let found = service
            .search_news(&locale("en"), "NEW", Pagination::default())
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].id, 3);

        let drafts = service
            .search_news(&locale("en"), "draft", Pagination::default())
            .await
            .unwrap();
        assert_eq!(drafts.total, 0);
        assert!(drafts.items.is_empty());
    }

    fn site_pages() -> MemoryContentStore {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let store = MemoryContentStore::new();
        store
            .add_page(
                Page::new(1, "about")
                    .with_translation("en", "About us", "Making fasteners since 1999")
                    .created_at(base),
            )
            .add_page(
                Page::new(2, "privacy")
                    .with_translation("en", "Privacy", "We keep your data")
                    .created_at(base + Duration::days(1)),
            )
            .add_page(
                Page::new(3, "certificates")
                    .with_translation("en", "Certificates", "ISO 9001")
                    .created_at(base + Duration::days(2)),
            );
        store
    }

    #[tokio::test]
    async fn test_list_pages_window_and_total() {
        let store = site_pages();
        let listing = service(&store)
            .list_pages(&locale("en"), Pagination::clamped(1, 1))
            .await
            .unwrap();
        assert_eq!(listing.total, 3);
        let ids: Vec<i64> = listing.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn test_search_pages_by_content() {
        let store = site_pages();
        let listing = service(&store)
            .search_pages(&locale("en"), "SINCE 19", Pagination::default())
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].slug, "about");
    }

    #[tokio::test]
    async fn test_page_by_id() {
        let store = site_pages();
        let service = service(&store);
        let page = service.page(&locale("en"), 2).await.unwrap();
        assert_eq!(page.title, "Privacy");
        assert!(matches!(
            service.page(&locale("en"), 9).await,
            Err(ContentError::NotFound(_))
        ));
    }

    fn library() -> MemoryContentStore {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let store = MemoryContentStore::new();
        store
            .add_document(
                Document::new(1, "certificate", "/f/iso.pdf")
                    .with_translation("en", "ISO 9001", "Quality management")
                    .created_at(base),
            )
            .add_document(
                Document::new(2, "reference", "/f/torque.pdf")
                    .with_translation("en", "Torque table", "Tightening torques for bolts")
                    .created_at(base + Duration::days(1)),
            )
            .add_document(
                Document::new(3, "reference", "/f/threads.pdf")
                    .with_translation("en", "Thread pitches", "Metric threads")
                    .created_at(base + Duration::days(2)),
            );
        store
    }

    #[tokio::test]
    async fn test_list_documents_newest_first() {
        let store = library();
        let listing = service(&store)
            .list_documents(&locale("en"), Pagination::clamped(0, 2))
            .await
            .unwrap();
        assert_eq!(listing.total, 3);
        let ids: Vec<i64> = listing.items.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_search_documents_by_description() {
        let store = library();
        let listing = service(&store)
            .search_documents(&locale("en"), "bolts", Pagination::default())
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].title, "Torque table");
    }

    #[tokio::test]
    async fn test_document_by_id() {
        let store = library();
        let service = service(&store);
        let document = service.document(&locale("en"), 1).await.unwrap();
        assert_eq!(document.file_url, "/f/iso.pdf");
        assert!(matches!(
            service.document(&locale("en"), 40).await,
            Err(ContentError::NotFound(_))
        ));
    }

    fn directory() -> MemoryContentStore {
        let store = MemoryContentStore::new();
        store
            .add_contact(
                Contact::new(1, "phone", "+1 555 0101")
                    .with_sort_order(3)
                    .with_label("en", "Sales"),
            )
            .add_contact(
                Contact::new(2, "email", "info@example.test")
                    .with_sort_order(1)
                    .with_label("en", "Mail"),
            )
            .add_contact(
                Contact::new(3, "address", "1 Main St")
                    .with_sort_order(2)
                    .with_label("en", "Office"),
            );
        store
    }

    #[tokio::test]
    async fn test_list_contacts_window_and_total() {
        let store = directory();
        let listing = service(&store)
            .list_contacts(&locale("en"), Pagination::clamped(1, 5))
            .await
            .unwrap();
        assert_eq!(listing.total, 3);
        let labels: Vec<&str> = listing.items.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Office", "Sales"]);
    }

    #[tokio::test]
    async fn test_contact_by_id() {
        let store = directory();
        let service = service(&store);
        let contact = service.contact(&locale("ru"), 2).await.unwrap();
        assert_eq!(contact.label, "Mail");
        assert_eq!(contact.value, "info@example.test");
        assert!(matches!(
            service.contact(&locale("en"), 99).await,
            Err(ContentError::NotFound(_))
        ));
    }
}

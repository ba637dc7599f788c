//! Cross-type search.
//!
//! Products, news, pages and documents are queried concurrently and merged in
//! that fixed order. A section whose query fails is left out of the results
//! and reported in `Partial::failures`; the rest still come back.

use crate::dto::{Partial, ResultKind, SearchResult, SectionFailure};
use crate::i18n::Locale;
use crate::models::{Document, News, Page, Product};
use crate::query::{ContentFilter, Pagination, ProductFilter, ProductQuery, ProductSort, TextMatch};
use crate::service::SiteService;
use crate::store::StoreResult;
use tracing::{debug, warn};

/// Per-type caps applied before merging
const PRODUCT_HITS: u32 = 10;
const NEWS_HITS: u32 = 10;

const NEWS_DATE_FORMAT: &str = "%d.%m.%Y";

impl SiteService {
    /// Search every content type for `query` in `locale`.
    pub async fn search_all(&self, locale: &Locale, query: &str) -> Partial<Vec<SearchResult>> {
        let text = TextMatch::new(locale, query);
        let product_query = ProductQuery::new(
            ProductFilter::default().with_text(text.clone()),
            ProductSort::default(),
            locale,
        );
        let content_filter = ContentFilter::matching(text);

        let (products, news, pages, documents) = futures::join!(
            self.store().products(&product_query, Pagination::first(PRODUCT_HITS)),
            self.store().news(&content_filter, Pagination::first(NEWS_HITS)),
            self.store().pages(&content_filter, Pagination::all()),
            self.store().documents(&content_filter, Pagination::all()),
        );

        let mut results = Vec::new();
        let mut failures = Vec::new();

        collect(&mut results, &mut failures, "products", products, |p: &Product| {
            self.product_hit(p, locale)
        });
        collect(&mut results, &mut failures, "news", news, |n: &News| {
            self.news_hit(n, locale)
        });
        collect(&mut results, &mut failures, "pages", pages, |p: &Page| {
            self.page_hit(p, locale)
        });
        collect(&mut results, &mut failures, "documents", documents, |d: &Document| {
            self.document_hit(d, locale)
        });

        debug!(
            "Search '{}' ({}): {} results, {} failed sections",
            query,
            locale,
            results.len(),
            failures.len()
        );
        Partial {
            value: results,
            failures,
        }
    }

    /// `search_all` truncated to `limit` results after merging, so earlier
    /// types can crowd out later ones entirely.
    pub async fn search_api(
        &self,
        locale: &Locale,
        query: &str,
        limit: usize,
    ) -> Partial<Vec<SearchResult>> {
        let mut partial = self.search_all(locale, query).await;
        partial.value.truncate(limit);
        partial
    }

    fn product_hit(&self, product: &Product, locale: &Locale) -> SearchResult {
        let translation = self.pick(&product.translations, locale);
        SearchResult {
            kind: ResultKind::Product,
            id: product.id,
            title: translation.map(|t| t.name.clone()).unwrap_or_default(),
            description: translation
                .map(|t| t.short_description.clone())
                .unwrap_or_default(),
            url: format!("/{}/product/{}", locale, product.id),
            image: non_empty(&product.image_url),
            date: None,
        }
    }

    fn news_hit(&self, news: &News, locale: &Locale) -> SearchResult {
        let translation = self.pick(&news.translations, locale);
        SearchResult {
            kind: ResultKind::News,
            id: news.id,
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            description: translation.map(|t| t.excerpt.clone()).unwrap_or_default(),
            url: format!("/{}/news/{}", locale, news.id),
            image: non_empty(&news.image_url),
            date: Some(news.created_at.format(NEWS_DATE_FORMAT).to_string()),
        }
    }

    fn page_hit(&self, page: &Page, locale: &Locale) -> SearchResult {
        SearchResult {
            kind: ResultKind::Page,
            id: page.id,
            title: self.text(&page.translations, locale, |t| t.title.as_str()),
            description: String::new(),
            url: format!("/{}/page/{}", locale, page.slug),
            image: None,
            date: None,
        }
    }

    fn document_hit(&self, document: &Document, locale: &Locale) -> SearchResult {
        let translation = self.pick(&document.translations, locale);
        SearchResult {
            kind: ResultKind::Document,
            id: document.id,
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            // Documents link straight to the file
            url: document.file_url.clone(),
            image: None,
            date: None,
        }
    }
}

fn collect<T>(
    results: &mut Vec<SearchResult>,
    failures: &mut Vec<SectionFailure>,
    section: &'static str,
    outcome: StoreResult<Vec<T>>,
    to_hit: impl Fn(&T) -> SearchResult,
) {
    match outcome {
        Ok(items) => results.extend(items.iter().map(to_hit)),
        Err(e) => {
            warn!("Search section '{}' failed, skipping: {}", section, e);
            failures.push(SectionFailure::new(section, &e));
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{MemoryContentStore, StoreSection};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn en() -> Locale {
        Locale::parse("en").unwrap()
    }

    /// 2 bolt products, 5 bolt news, 1 bolt page, 1 bolt document
    fn bolts() -> (SiteService, MemoryContentStore) {
        let store = MemoryContentStore::new();
        store
            .add_product(
                Product::new(1, 1, "HB-8")
                    .with_translation("en", "Hex bolt", "Zinc plated", "M8 hex bolt")
                    .with_image("/img/hb8.jpg")
                    .with_sort_order(1),
            )
            .add_product(
                Product::new(2, 1, "AB-10")
                    .with_translation("en", "Anchor", "Anchor BOLT for concrete", "")
                    .with_sort_order(2),
            )
            .add_product(Product::new(3, 1, "N-8").with_translation("en", "Nut", "", ""));
        for i in 1..=5 {
            store.add_news(
                News::new(10 + i, true)
                    .with_translation("en", &format!("Bolt news {}", i), "", "excerpt")
                    .created_at(Utc.with_ymd_and_hms(2024, 3, i as u32, 9, 0, 0).unwrap()),
            );
        }
        store
            .add_news(News::new(20, false).with_translation("en", "Bolt draft", "", ""))
            .add_page(
                Page::new(30, "bolt-guide").with_translation("en", "Guide", "How to pick a bolt"),
            )
            .add_document(
                Document::new(40, "reference", "/files/bolts.pdf")
                    .with_translation("en", "Bolt catalogue", "PDF"),
            );
        let service = SiteService::new(
            Arc::new(store.clone()),
            Config::for_site("http://example.test"),
        );
        (service, store)
    }

    fn kinds(results: &[SearchResult]) -> Vec<ResultKind> {
        results.iter().map(|r| r.kind).collect()
    }

    #[tokio::test]
    async fn test_search_all_type_order() {
        let (service, _) = bolts();
        let partial = service.search_all(&en(), "bolt").await;
        assert!(partial.is_complete());
        assert_eq!(
            kinds(&partial.value),
            vec![
                ResultKind::Product,
                ResultKind::Product,
                ResultKind::News,
                ResultKind::News,
                ResultKind::News,
                ResultKind::News,
                ResultKind::News,
                ResultKind::Page,
                ResultKind::Document,
            ]
        );
    }

    #[tokio::test]
    async fn test_search_api_truncates_after_merge() {
        let (service, _) = bolts();
        let partial = service.search_api(&en(), "bolt", 3).await;
        assert_eq!(
            kinds(&partial.value),
            vec![ResultKind::Product, ResultKind::Product, ResultKind::News]
        );
    }

    #[tokio::test]
    async fn test_result_fields_per_type() {
        let (service, _) = bolts();
        let results = service.search_all(&en(), "bolt").await.value;

        let product = &results[0];
        assert_eq!(product.url, "/en/product/1");
        assert_eq!(product.description, "M8 hex bolt");
        assert_eq!(product.image.as_deref(), Some("/img/hb8.jpg"));
        assert!(results[1].image.is_none());

        let news = &results[2];
        assert_eq!(news.url, "/en/news/15");
        assert_eq!(news.date.as_deref(), Some("05.03.2024"));
        assert_eq!(news.description, "excerpt");

        let page = &results[7];
        assert_eq!(page.url, "/en/page/bolt-guide");
        assert_eq!(page.description, "");

        let document = &results[8];
        assert_eq!(document.url, "/files/bolts.pdf");
        assert_eq!(document.description, "PDF");
    }

    #[tokio::test]
    async fn test_failed_section_is_reported_not_fatal() {
        let (service, store) = bolts();
        store.fail_section(StoreSection::News);
        let partial = service.search_all(&en(), "bolt").await;

        assert!(!partial.is_complete());
        assert_eq!(partial.failures.len(), 1);
        assert_eq!(partial.failures[0].section, "news");
        assert_eq!(
            kinds(&partial.value),
            vec![
                ResultKind::Product,
                ResultKind::Product,
                ResultKind::Page,
                ResultKind::Document
            ]
        );
    }

    #[tokio::test]
    async fn test_per_type_caps() {
        let store = MemoryContentStore::new();
        for i in 1..=15 {
            store.add_product(
                Product::new(i, 1, &format!("S-{}", i)).with_translation("en", "Screw", "", ""),
            );
            store.add_page(
                Page::new(100 + i, &format!("screw-{}", i)).with_translation("en", "Screw", ""),
            );
        }
        let service = SiteService::new(Arc::new(store), Config::for_site("http://example.test"));
        let results = service.search_all(&en(), "screw").await.value;
        let products = results.iter().filter(|r| r.kind == ResultKind::Product).count();
        let pages = results.iter().filter(|r| r.kind == ResultKind::Page).count();
        assert_eq!(products, 10);
        assert_eq!(pages, 15);
    }

    proptest! {
        #[test]
        fn prop_search_api_is_prefix_of_search_all(limit in 0usize..15) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (service, _) = bolts();
            let all = runtime.block_on(service.search_all(&en(), "bolt")).value;
            let truncated = runtime.block_on(service.search_api(&en(), "bolt", limit)).value;
            prop_assert_eq!(truncated.len(), limit.min(all.len()));
            prop_assert_eq!(&truncated[..], &all[..truncated.len()]);
        }
    }
}

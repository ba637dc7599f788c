//! XML sitemap for one locale: static routes, then products, then news.

use crate::dto::{Partial, SectionFailure};
use crate::i18n::Locale;
use crate::query::{ContentFilter, Pagination, ProductFilter, ProductQuery, ProductSort};
use crate::service::SiteService;
use std::fmt::Write;
use tracing::{debug, warn};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// (path under the locale, priority)
static STATIC_ROUTES: [(&str, &str); 6] = [
    ("", "1.0"),
    ("about", "0.8"),
    ("products", "0.9"),
    ("news", "0.7"),
    ("documents", "0.6"),
    ("contacts", "0.7"),
];

const MAX_PRODUCTS: u32 = 1000;
const MAX_NEWS: u32 = 100;

struct UrlEntry<'a> {
    loc: String,
    priority: &'a str,
    changefreq: &'a str,
    lastmod: Option<String>,
}

impl SiteService {
    /// Sitemap document for `locale`.
    ///
    /// A failed product or news query leaves that section out; the failure
    /// is logged and listed in the result.
    pub async fn sitemap(&self, locale: &Locale) -> Partial<String> {
        let site = self.config().site_url.trim_end_matches('/');
        let mut entries: Vec<UrlEntry> = STATIC_ROUTES
            .iter()
            .map(|&(path, priority)| UrlEntry {
                loc: format!("{}/{}/{}", site, locale, path),
                priority,
                changefreq: "weekly",
                lastmod: None,
            })
            .collect();
        let mut failures = Vec::new();

        let product_query =
            ProductQuery::new(ProductFilter::default(), ProductSort::default(), locale);
        let news_filter = ContentFilter::default();
        let (products, news) = futures::join!(
            self.store()
                .products(&product_query, Pagination::first(MAX_PRODUCTS)),
            self.store().news(&news_filter, Pagination::first(MAX_NEWS)),
        );

        match products {
            Ok(products) => entries.extend(products.iter().map(|p| UrlEntry {
                loc: format!("{}/{}/product/{}", site, locale, p.id),
                priority: "0.6",
                changefreq: "monthly",
                lastmod: None,
            })),
            Err(e) => {
                warn!("Sitemap products section failed, skipping: {}", e);
                failures.push(SectionFailure::new("products", &e));
            }
        }

        match news {
            Ok(news) => entries.extend(news.iter().map(|n| UrlEntry {
                loc: format!("{}/{}/news/{}", site, locale, n.id),
                priority: "0.5",
                changefreq: "yearly",
                lastmod: Some(n.created_at.format("%Y-%m-%d").to_string()),
            })),
            Err(e) => {
                warn!("Sitemap news section failed, skipping: {}", e);
                failures.push(SectionFailure::new("news", &e));
            }
        }

        debug!("Sitemap for {}: {} urls", locale, entries.len());
        Partial {
            value: render(&entries),
            failures,
        }
    }
}

fn render(entries: &[UrlEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    // Writing into a String cannot fail
    let _ = writeln!(xml, "<urlset xmlns=\"{}\">", SITEMAP_NS);
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape(&entry.loc));
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        if let Some(lastmod) = &entry.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", lastmod);
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{News, Product};
    use crate::store::{MemoryContentStore, StoreSection};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn locale(code: &str) -> Locale {
        Locale::parse(code).unwrap()
    }

    fn site(store: &MemoryContentStore) -> SiteService {
        SiteService::new(Arc::new(store.clone()), Config::for_site("https://example.test/"))
    }

    fn seeded() -> MemoryContentStore {
        let store = MemoryContentStore::new();
        store
            .add_product(Product::new(1, 1, "A"))
            .add_product(Product::new(2, 1, "B"))
            .add_news(
                News::new(7, true).created_at(Utc.with_ymd_and_hms(2024, 2, 9, 15, 30, 0).unwrap()),
            )
            .add_news(News::new(8, false));
        store
    }

    #[tokio::test]
    async fn test_entry_counts() {
        let store = seeded();
        let sitemap = site(&store).sitemap(&locale("en")).await;
        assert!(sitemap.is_complete());
        // 6 static + 2 products + 1 published news
        assert_eq!(sitemap.value.matches("<url>").count(), 9);
        assert_eq!(sitemap.value.matches("<lastmod>").count(), 1);
    }

    #[tokio::test]
    async fn test_locations_and_lastmod() {
        let store = seeded();
        let xml = site(&store).sitemap(&locale("ru")).await.value;
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains("<loc>https://example.test/ru/</loc>"));
        assert!(xml.contains("<loc>https://example.test/ru/about</loc>"));
        assert!(xml.contains("<loc>https://example.test/ru/product/2</loc>"));
        assert!(xml.contains("<loc>https://example.test/ru/news/7</loc>"));
        assert!(xml.contains("<lastmod>2024-02-09</lastmod>"));
        assert!(!xml.contains("/news/8<"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[tokio::test]
    async fn test_static_priorities() {
        let store = MemoryContentStore::new();
        let xml = site(&store).sitemap(&locale("en")).await.value;
        let priorities: Vec<&str> = xml
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<priority>"))
            .filter_map(|l| l.strip_suffix("</priority>"))
            .collect();
        assert_eq!(priorities, vec!["1.0", "0.8", "0.9", "0.7", "0.6", "0.7"]);
    }

    #[tokio::test]
    async fn test_failed_section_is_skipped() {
        let store = seeded();
        store.fail_section(StoreSection::Products);
        let sitemap = site(&store).sitemap(&locale("en")).await;
        assert_eq!(sitemap.failures.len(), 1);
        assert_eq!(sitemap.failures[0].section, "products");
        assert_eq!(sitemap.value.matches("<url>").count(), 7);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a&b<c>\"'"), "a&amp;b&lt;c&gt;&quot;&apos;");
    }
}

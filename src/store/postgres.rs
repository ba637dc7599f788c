//! Postgres-backed content store.
//!
//! Base rows are fetched first, then translations (and product specs /
//! category names) for the whole page are loaded with one `= ANY($1)` query
//! per table, ordered by locale code.

use super::{ContentStore, StoreResult};
use crate::config::Config;
use crate::models::{
    Category, CategoryTranslation, Contact, ContactTranslation, Document, DocumentTranslation,
    NewCategory, NewFeedback, News, NewsTranslation, Page, PageTranslation, Product, ProductSpec,
    ProductTranslation, SpecTranslation,
};
use crate::query::{
    ContentFilter, Pagination, ProductFilter, ProductQuery, SortField, TextMatch,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use tracing::{debug, info};

/// Translation table layout used to build text-match subqueries.
struct TranslationTable {
    table: &'static str,
    owner_column: &'static str,
    text_columns: &'static [&'static str],
}

const PAGE_TEXT: TranslationTable = TranslationTable {
    table: "page_translations",
    owner_column: "page_id",
    text_columns: &["title", "content"],
};

const PRODUCT_TEXT: TranslationTable = TranslationTable {
    table: "product_translations",
    owner_column: "product_id",
    text_columns: &["name", "description", "short_description"],
};

const NEWS_TEXT: TranslationTable = TranslationTable {
    table: "news_translations",
    owner_column: "news_id",
    text_columns: &["title", "content", "excerpt"],
};

const DOCUMENT_TEXT: TranslationTable = TranslationTable {
    table: "document_translations",
    owner_column: "document_id",
    text_columns: &["title", "description"],
};

const CONTACT_TEXT: TranslationTable = TranslationTable {
    table: "contact_translations",
    owner_column: "contact_id",
    text_columns: &["label"],
};

const SCHEMA: &[(&str, &str)] = &[
    (
        "pages",
        "CREATE TABLE IF NOT EXISTS pages (
            id BIGSERIAL PRIMARY KEY,
            slug VARCHAR(255) NOT NULL UNIQUE,
            template VARCHAR(100) NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "page_translations",
        "CREATE TABLE IF NOT EXISTS page_translations (
            page_id BIGINT NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            title VARCHAR(255) NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            meta_title VARCHAR(255) NOT NULL DEFAULT '',
            meta_description VARCHAR(500) NOT NULL DEFAULT '',
            PRIMARY KEY (page_id, language_code)
        )",
    ),
    (
        "product_categories",
        "CREATE TABLE IF NOT EXISTS product_categories (
            id BIGSERIAL PRIMARY KEY,
            parent_id BIGINT REFERENCES product_categories(id),
            slug VARCHAR(255) NOT NULL UNIQUE,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "product_category_translations",
        "CREATE TABLE IF NOT EXISTS product_category_translations (
            category_id BIGINT NOT NULL REFERENCES product_categories(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            name VARCHAR(255) NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (category_id, language_code)
        )",
    ),
    (
        "products",
        "CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            category_id BIGINT NOT NULL REFERENCES product_categories(id),
            sku VARCHAR(100) NOT NULL UNIQUE,
            image_url VARCHAR(500) NOT NULL DEFAULT '',
            file_url VARCHAR(500) NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "products_category_idx",
        "CREATE INDEX IF NOT EXISTS products_category_idx ON products (category_id)",
    ),
    (
        "product_translations",
        "CREATE TABLE IF NOT EXISTS product_translations (
            product_id BIGINT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            name VARCHAR(255) NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            short_description VARCHAR(500) NOT NULL DEFAULT '',
            PRIMARY KEY (product_id, language_code)
        )",
    ),
    (
        "product_specs",
        "CREATE TABLE IF NOT EXISTS product_specs (
            id BIGSERIAL PRIMARY KEY,
            product_id BIGINT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "product_spec_translations",
        "CREATE TABLE IF NOT EXISTS product_spec_translations (
            spec_id BIGINT NOT NULL REFERENCES product_specs(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            name VARCHAR(255) NOT NULL DEFAULT '',
            value VARCHAR(500) NOT NULL DEFAULT '',
            PRIMARY KEY (spec_id, language_code)
        )",
    ),
    (
        "news",
        "CREATE TABLE IF NOT EXISTS news (
            id BIGSERIAL PRIMARY KEY,
            image_url VARCHAR(500) NOT NULL DEFAULT '',
            published BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "news_translations",
        "CREATE TABLE IF NOT EXISTS news_translations (
            news_id BIGINT NOT NULL REFERENCES news(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            title VARCHAR(255) NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            excerpt VARCHAR(500) NOT NULL DEFAULT '',
            PRIMARY KEY (news_id, language_code)
        )",
    ),
    (
        "documents",
        "CREATE TABLE IF NOT EXISTS documents (
            id BIGSERIAL PRIMARY KEY,
            file_url VARCHAR(500) NOT NULL DEFAULT '',
            type VARCHAR(50) NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "document_translations",
        "CREATE TABLE IF NOT EXISTS document_translations (
            document_id BIGINT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            title VARCHAR(255) NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (document_id, language_code)
        )",
    ),
    (
        "contacts",
        "CREATE TABLE IF NOT EXISTS contacts (
            id BIGSERIAL PRIMARY KEY,
            type VARCHAR(50) NOT NULL DEFAULT '',
            value VARCHAR(500) NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "contact_translations",
        "CREATE TABLE IF NOT EXISTS contact_translations (
            contact_id BIGINT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            language_code VARCHAR(10) NOT NULL,
            label VARCHAR(255) NOT NULL DEFAULT '',
            PRIMARY KEY (contact_id, language_code)
        )",
    ),
    (
        "feedback",
        "CREATE TABLE IF NOT EXISTS feedback (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL DEFAULT '',
            phone VARCHAR(20) NOT NULL DEFAULT '',
            company VARCHAR(200) NOT NULL DEFAULT '',
            message TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            processed BOOLEAN NOT NULL DEFAULT FALSE
        )",
    ),
];

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Open a connection pool using the configured URL and pool size
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context(format!(
                "Failed to connect to database at {}",
                config.redacted_database_url()
            ))?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing tables (safe to run on every start)
    pub async fn init_schema(&self) -> Result<()> {
        for (name, ddl) in SCHEMA {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .context(format!("Failed to create {}", name))?;
        }
        info!("✓ Database schema ready ({} objects)", SCHEMA.len());
        Ok(())
    }

    // ==================== Relation loading ====================

    async fn attach_page_translations(&self, mut pages: Vec<Page>) -> StoreResult<Vec<Page>> {
        if pages.is_empty() {
            return Ok(pages);
        }
        let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
        let rows = sqlx::query(
            "SELECT page_id, language_code, title, content, meta_title, meta_description
             FROM page_translations
             WHERE page_id = ANY($1)
             ORDER BY page_id, language_code",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped = group_rows(&rows, "page_id", |row| {
            Ok(PageTranslation {
                locale: row.try_get("language_code")?,
                title: row.try_get("title")?,
                content: row.try_get("content")?,
                meta_title: row.try_get("meta_title")?,
                meta_description: row.try_get("meta_description")?,
            })
        })?;
        for page in &mut pages {
            page.translations = grouped.remove(&page.id).unwrap_or_default();
        }
        Ok(pages)
    }

    /// Attach translations and one level of children to each category
    async fn attach_category_relations(
        &self,
        mut categories: Vec<Category>,
    ) -> StoreResult<Vec<Category>> {
        if categories.is_empty() {
            return Ok(categories);
        }
        let parent_ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
        let child_rows = sqlx::query(
            "SELECT id, parent_id, slug, sort_order, created_at
             FROM product_categories
             WHERE parent_id = ANY($1)
             ORDER BY sort_order ASC, id ASC",
        )
        .bind(&parent_ids)
        .fetch_all(&self.pool)
        .await?;
        let children = child_rows
            .iter()
            .map(category_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let mut all_ids = parent_ids;
        all_ids.extend(children.iter().map(|c| c.id));
        let mut translations = self.category_translations(&all_ids).await?;

        let mut children_by_parent: HashMap<i64, Vec<Category>> = HashMap::new();
        for mut child in children {
            child.translations = translations.remove(&child.id).unwrap_or_default();
            if let Some(parent_id) = child.parent_id {
                children_by_parent.entry(parent_id).or_default().push(child);
            }
        }

        for category in &mut categories {
            category.translations = translations.remove(&category.id).unwrap_or_default();
            category.children = children_by_parent.remove(&category.id).unwrap_or_default();
        }
        Ok(categories)
    }

    async fn category_translations(
        &self,
        ids: &[i64],
    ) -> StoreResult<HashMap<i64, Vec<CategoryTranslation>>> {
        let rows = sqlx::query(
            "SELECT category_id, language_code, name, description
             FROM product_category_translations
             WHERE category_id = ANY($1)
             ORDER BY category_id, language_code",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        group_rows(&rows, "category_id", |row| {
            Ok(CategoryTranslation {
                locale: row.try_get("language_code")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
            })
        })
    }

    /// Attach translations, ordered specs and category names to products
    async fn attach_product_relations(
        &self,
        mut products: Vec<Product>,
    ) -> StoreResult<Vec<Product>> {
        if products.is_empty() {
            return Ok(products);
        }
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();

        let rows = sqlx::query(
            "SELECT product_id, language_code, name, description, short_description
             FROM product_translations
             WHERE product_id = ANY($1)
             ORDER BY product_id, language_code",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let mut translations = group_rows(&rows, "product_id", |row| {
            Ok(ProductTranslation {
                locale: row.try_get("language_code")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                short_description: row.try_get("short_description")?,
            })
        })?;

        let spec_rows = sqlx::query(
            "SELECT id, product_id, sort_order
             FROM product_specs
             WHERE product_id = ANY($1)
             ORDER BY product_id, sort_order ASC, id ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let mut specs = spec_rows
            .iter()
            .map(|row| {
                Ok(ProductSpec {
                    id: row.try_get("id")?,
                    product_id: row.try_get("product_id")?,
                    sort_order: row.try_get("sort_order")?,
                    translations: Vec::new(),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        if !specs.is_empty() {
            let spec_ids: Vec<i64> = specs.iter().map(|s| s.id).collect();
            let rows = sqlx::query(
                "SELECT spec_id, language_code, name, value
                 FROM product_spec_translations
                 WHERE spec_id = ANY($1)
                 ORDER BY spec_id, language_code",
            )
            .bind(&spec_ids)
            .fetch_all(&self.pool)
            .await?;
            let mut spec_translations = group_rows(&rows, "spec_id", |row| {
                Ok(SpecTranslation {
                    locale: row.try_get("language_code")?,
                    name: row.try_get("name")?,
                    value: row.try_get("value")?,
                })
            })?;
            for spec in &mut specs {
                spec.translations = spec_translations.remove(&spec.id).unwrap_or_default();
            }
        }
        let mut specs_by_product: HashMap<i64, Vec<ProductSpec>> = HashMap::new();
        for spec in specs {
            specs_by_product.entry(spec.product_id).or_default().push(spec);
        }

        let mut category_ids: Vec<i64> = products.iter().map(|p| p.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();
        let category_names = self.category_translations(&category_ids).await?;

        for product in &mut products {
            product.translations = translations.remove(&product.id).unwrap_or_default();
            product.specs = specs_by_product.remove(&product.id).unwrap_or_default();
            product.category_translations = category_names
                .get(&product.category_id)
                .cloned()
                .unwrap_or_default();
        }
        Ok(products)
    }

    async fn attach_news_translations(&self, mut items: Vec<News>) -> StoreResult<Vec<News>> {
        if items.is_empty() {
            return Ok(items);
        }
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();
        let rows = sqlx::query(
            "SELECT news_id, language_code, title, content, excerpt
             FROM news_translations
             WHERE news_id = ANY($1)
             ORDER BY news_id, language_code",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped = group_rows(&rows, "news_id", |row| {
            Ok(NewsTranslation {
                locale: row.try_get("language_code")?,
                title: row.try_get("title")?,
                content: row.try_get("content")?,
                excerpt: row.try_get("excerpt")?,
            })
        })?;
        for item in &mut items {
            item.translations = grouped.remove(&item.id).unwrap_or_default();
        }
        Ok(items)
    }

    async fn attach_document_translations(
        &self,
        mut documents: Vec<Document>,
    ) -> StoreResult<Vec<Document>> {
        if documents.is_empty() {
            return Ok(documents);
        }
        let ids: Vec<i64> = documents.iter().map(|d| d.id).collect();
        let rows = sqlx::query(
            "SELECT document_id, language_code, title, description
             FROM document_translations
             WHERE document_id = ANY($1)
             ORDER BY document_id, language_code",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped = group_rows(&rows, "document_id", |row| {
            Ok(DocumentTranslation {
                locale: row.try_get("language_code")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
            })
        })?;
        for document in &mut documents {
            document.translations = grouped.remove(&document.id).unwrap_or_default();
        }
        Ok(documents)
    }

    async fn attach_contact_translations(
        &self,
        mut contacts: Vec<Contact>,
    ) -> StoreResult<Vec<Contact>> {
        if contacts.is_empty() {
            return Ok(contacts);
        }
        let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
        let rows = sqlx::query(
            "SELECT contact_id, language_code, label
             FROM contact_translations
             WHERE contact_id = ANY($1)
             ORDER BY contact_id, language_code",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped = group_rows(&rows, "contact_id", |row| {
            Ok(ContactTranslation {
                locale: row.try_get("language_code")?,
                label: row.try_get("label")?,
            })
        })?;
        for contact in &mut contacts {
            contact.translations = grouped.remove(&contact.id).unwrap_or_default();
        }
        Ok(contacts)
    }

    async fn count(&self, mut qb: QueryBuilder<'_, Postgres>) -> StoreResult<u64> {
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn pages(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<Page>> {
        let mut qb = QueryBuilder::new(
            "SELECT pg.id, pg.slug, pg.template, pg.created_at, pg.updated_at \
             FROM pages pg WHERE TRUE",
        );
        push_content_predicate(&mut qb, filter, "pg", None, &PAGE_TEXT);
        qb.push(" ORDER BY pg.created_at DESC, pg.id DESC");
        push_pagination(&mut qb, page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let pages = rows.iter().map(page_from_row).collect::<StoreResult<Vec<_>>>()?;
        self.attach_page_translations(pages).await
    }

    async fn count_pages(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM pages pg WHERE TRUE");
        push_content_predicate(&mut qb, filter, "pg", None, &PAGE_TEXT);
        self.count(qb).await
    }

    async fn page_by_id(&self, id: i64) -> StoreResult<Option<Page>> {
        let row = sqlx::query(
            "SELECT id, slug, template, created_at, updated_at FROM pages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_page_translations(vec![page_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn page_by_slug(&self, slug: &str) -> StoreResult<Option<Page>> {
        let row = sqlx::query(
            "SELECT id, slug, template, created_at, updated_at FROM pages WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_page_translations(vec![page_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn root_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, parent_id, slug, sort_order, created_at
             FROM product_categories
             WHERE parent_id IS NULL
             ORDER BY sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        let roots = rows
            .iter()
            .map(category_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        self.attach_category_relations(roots).await
    }

    async fn category_by_id(&self, id: i64) -> StoreResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, parent_id, slug, sort_order, created_at
             FROM product_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_category_relations(vec![category_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, parent_id, slug, sort_order, created_at
             FROM product_categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_category_relations(vec![category_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn insert_category(&self, category: &NewCategory) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO product_categories (parent_id, slug, sort_order, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(category.parent_id)
        .bind(&category.slug)
        .bind(category.sort_order)
        .bind(category.created_at)
        .fetch_one(&mut *tx)
        .await?;

        for translation in &category.translations {
            sqlx::query(
                "INSERT INTO product_category_translations
                 (category_id, language_code, name, description)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(&translation.locale)
            .bind(&translation.name)
            .bind(&translation.description)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!("Inserted category {} ({})", id, category.slug);
        Ok(id)
    }

    async fn products(&self, query: &ProductQuery, page: Pagination) -> StoreResult<Vec<Product>> {
        let mut qb = QueryBuilder::new(
            "SELECT p.id, p.category_id, p.sku, p.image_url, p.file_url, p.sort_order, \
             p.created_at, p.updated_at FROM products p",
        );
        if query.sort.field == SortField::Name {
            qb.push(
                " LEFT JOIN product_translations sort_t ON sort_t.product_id = p.id \
                 AND sort_t.language_code = ",
            );
            qb.push_bind(query.locale.clone());
        }
        qb.push(" WHERE TRUE");
        push_product_predicate(&mut qb, &query.filter);

        let direction = query.sort.direction.as_sql();
        match query.sort.field {
            SortField::Name => {
                qb.push(format!(" ORDER BY sort_t.name {}, p.id ASC", direction));
            }
            SortField::CreatedAt => {
                qb.push(format!(" ORDER BY p.created_at {}, p.id ASC", direction));
            }
            SortField::Position => {
                qb.push(format!(
                    " ORDER BY p.sort_order {}, p.created_at DESC, p.id ASC",
                    direction
                ));
            }
        }
        push_pagination(&mut qb, page);

        debug!("products query: {}", qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        self.attach_product_relations(products).await
    }

    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products p WHERE TRUE");
        push_product_predicate(&mut qb, filter);
        self.count(qb).await
    }

    async fn product_by_id(&self, id: i64) -> StoreResult<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, category_id, sku, image_url, file_url, sort_order, created_at, updated_at
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_product_relations(vec![product_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn news(&self, filter: &ContentFilter, page: Pagination) -> StoreResult<Vec<News>> {
        let mut qb = QueryBuilder::new(
            "SELECT n.id, n.image_url, n.published, n.created_at, n.updated_at \
             FROM news n WHERE n.published = TRUE",
        );
        push_content_predicate(&mut qb, filter, "n", None, &NEWS_TEXT);
        qb.push(" ORDER BY n.created_at DESC, n.id DESC");
        push_pagination(&mut qb, page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let items = rows.iter().map(news_from_row).collect::<StoreResult<Vec<_>>>()?;
        self.attach_news_translations(items).await
    }

    async fn count_news(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM news n WHERE n.published = TRUE");
        push_content_predicate(&mut qb, filter, "n", None, &NEWS_TEXT);
        self.count(qb).await
    }

    async fn published_news_by_id(&self, id: i64) -> StoreResult<Option<News>> {
        let row = sqlx::query(
            "SELECT id, image_url, published, created_at, updated_at
             FROM news WHERE id = $1 AND published = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_news_translations(vec![news_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn documents(
        &self,
        filter: &ContentFilter,
        page: Pagination,
    ) -> StoreResult<Vec<Document>> {
        let mut qb = QueryBuilder::new(
            "SELECT d.id, d.file_url, d.type, d.created_at FROM documents d WHERE TRUE",
        );
        push_content_predicate(&mut qb, filter, "d", Some("type"), &DOCUMENT_TEXT);
        qb.push(" ORDER BY d.created_at DESC, d.id DESC");
        push_pagination(&mut qb, page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let documents = rows
            .iter()
            .map(document_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        self.attach_document_translations(documents).await
    }

    async fn count_documents(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM documents d WHERE TRUE");
        push_content_predicate(&mut qb, filter, "d", Some("type"), &DOCUMENT_TEXT);
        self.count(qb).await
    }

    async fn document_by_id(&self, id: i64) -> StoreResult<Option<Document>> {
        let row = sqlx::query("SELECT id, file_url, type, created_at FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self
                .attach_document_translations(vec![document_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn contacts(
        &self,
        filter: &ContentFilter,
        page: Pagination,
    ) -> StoreResult<Vec<Contact>> {
        let mut qb = QueryBuilder::new(
            "SELECT c.id, c.type, c.value, c.sort_order, c.created_at FROM contacts c WHERE TRUE",
        );
        push_content_predicate(&mut qb, filter, "c", Some("type"), &CONTACT_TEXT);
        qb.push(" ORDER BY c.sort_order ASC, c.id ASC");
        push_pagination(&mut qb, page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let contacts = rows
            .iter()
            .map(contact_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        self.attach_contact_translations(contacts).await
    }

    async fn count_contacts(&self, filter: &ContentFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM contacts c WHERE TRUE");
        push_content_predicate(&mut qb, filter, "c", Some("type"), &CONTACT_TEXT);
        self.count(qb).await
    }

    async fn contact_by_id(&self, id: i64) -> StoreResult<Option<Contact>> {
        let row = sqlx::query(
            "SELECT id, type, value, sort_order, created_at FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self
                .attach_contact_translations(vec![contact_from_row(&row)?])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn insert_feedback(&self, feedback: &NewFeedback) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO feedback (name, email, phone, company, message, created_at, processed)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(&feedback.phone)
        .bind(&feedback.company)
        .bind(&feedback.message)
        .bind(feedback.created_at)
        .bind(feedback.processed)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

// ==================== Query building ====================

fn push_product_predicate(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(category_id) = filter.category_id {
        qb.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(exclude_id) = filter.exclude_id {
        qb.push(" AND p.id <> ").push_bind(exclude_id);
    }
    if let Some(text) = &filter.text {
        push_text_match(qb, "p", &PRODUCT_TEXT, text);
    }
}

fn push_content_predicate(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &ContentFilter,
    alias: &str,
    type_column: Option<&str>,
    translations: &TranslationTable,
) {
    if let (Some(column), Some(type_tag)) = (type_column, &filter.type_tag) {
        qb.push(format!(" AND {}.{} = ", alias, column))
            .push_bind(type_tag.clone());
    }
    if let Some(text) = &filter.text {
        push_text_match(qb, alias, translations, text);
    }
}

/// `AND <alias>.id IN (SELECT owner FROM translations WHERE locale AND (LOWER(col) LIKE ..))`
fn push_text_match(
    qb: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    translations: &TranslationTable,
    text: &TextMatch,
) {
    let pattern = text.like_pattern();
    qb.push(format!(
        " AND {}.id IN (SELECT {} FROM {} WHERE language_code = ",
        alias, translations.owner_column, translations.table
    ));
    qb.push_bind(text.locale().to_string());
    qb.push(" AND (");
    for (i, column) in translations.text_columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("LOWER({}) LIKE ", column));
        qb.push_bind(pattern.clone());
    }
    qb.push("))");
}

fn push_pagination(qb: &mut QueryBuilder<'_, Postgres>, page: Pagination) {
    if let Some(limit) = page.limit {
        qb.push(" LIMIT ").push_bind(i64::from(limit));
    }
    qb.push(" OFFSET ").push_bind(i64::from(page.offset));
}

// ==================== Row decoding ====================

fn group_rows<T>(
    rows: &[PgRow],
    owner_column: &str,
    decode: impl Fn(&PgRow) -> StoreResult<T>,
) -> StoreResult<HashMap<i64, Vec<T>>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        let owner: i64 = row.try_get(owner_column)?;
        grouped.entry(owner).or_default().push(decode(row)?);
    }
    Ok(grouped)
}

fn page_from_row(row: &PgRow) -> StoreResult<Page> {
    Ok(Page {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        template: row.try_get("template")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        translations: Vec::new(),
    })
}

fn category_from_row(row: &PgRow) -> StoreResult<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        parent_id: row.try_get("parent_id")?,
        slug: row.try_get("slug")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        translations: Vec::new(),
        children: Vec::new(),
    })
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        sku: row.try_get("sku")?,
        image_url: row.try_get("image_url")?,
        file_url: row.try_get("file_url")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        translations: Vec::new(),
        specs: Vec::new(),
        category_translations: Vec::new(),
    })
}

fn news_from_row(row: &PgRow) -> StoreResult<News> {
    Ok(News {
        id: row.try_get("id")?,
        image_url: row.try_get("image_url")?,
        published: row.try_get("published")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        translations: Vec::new(),
    })
}

fn document_from_row(row: &PgRow) -> StoreResult<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        file_url: row.try_get("file_url")?,
        doc_type: row.try_get("type")?,
        created_at: row.try_get("created_at")?,
        translations: Vec::new(),
    })
}

fn contact_from_row(row: &PgRow) -> StoreResult<Contact> {
    Ok(Contact {
        id: row.try_get("id")?,
        contact_type: row.try_get("type")?,
        value: row.try_get("value")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        translations: Vec::new(),
    })
}

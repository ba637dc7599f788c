//! Category tree: root listing with one level of children, lookups by slug
//! or id, and slug derivation for new categories.

use crate::dto::CategoryDto;
use crate::error::{ContentError, ContentResult};
use crate::i18n::Locale;
use crate::models::{Category, CategoryTranslation, NewCategory};
use crate::query::ProductFilter;
use crate::service::SiteService;
use chrono::Utc;
use futures::future::try_join_all;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

static WHITESPACE: OnceLock<Regex> = OnceLock::new();

/// URL slug for a category name: lowercased, whitespace runs become `-`.
///
/// Applied once when a category is created; the result is stored and never
/// recomputed when translations change.
pub fn slugify(name: &str) -> String {
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(name.trim(), "-").to_lowercase()
}

/// A category to create. The stored slug is derived from `name`.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub translations: Vec<CategoryTranslation>,
}

impl SiteService {
    /// Store a new category under the slug of its name.
    ///
    /// Rejects a blank name, an unknown parent and a slug that is already
    /// taken; nothing is written in those cases.
    pub async fn create_category(&self, draft: CategoryDraft) -> ContentResult<i64> {
        let slug = slugify(&draft.name);
        if slug.is_empty() {
            return Err(ContentError::validation("category name is required"));
        }
        if let Some(parent_id) = draft.parent_id {
            if self.store().category_by_id(parent_id).await?.is_none() {
                return Err(ContentError::validation(format!(
                    "parent category {} does not exist",
                    parent_id
                )));
            }
        }
        if self.store().category_by_slug(&slug).await?.is_some() {
            return Err(ContentError::validation(format!(
                "category slug '{}' is already taken",
                slug
            )));
        }

        let category = NewCategory {
            parent_id: draft.parent_id,
            slug,
            sort_order: draft.sort_order,
            created_at: Utc::now(),
            translations: draft.translations,
        };
        let id = self.store().insert_category(&category).await?;
        info!("✓ Created category #{} '{}'", id, category.slug);
        Ok(id)
    }

    /// Top-level categories by sort order, each with its direct children.
    pub async fn list_root_categories(&self, locale: &Locale) -> ContentResult<Vec<CategoryDto>> {
        let roots = self.store().root_categories().await?;
        debug!("Loaded {} root categories", roots.len());
        try_join_all(roots.iter().map(|c| self.category_dto(c, locale))).await
    }

    pub async fn category_by_slug(
        &self,
        slug: &str,
        locale: &Locale,
    ) -> ContentResult<CategoryDto> {
        let category = self
            .store()
            .category_by_slug(slug)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("category '{}'", slug)))?;
        self.category_dto(&category, locale).await
    }

    pub async fn category_by_id(&self, id: i64, locale: &Locale) -> ContentResult<CategoryDto> {
        let category = self
            .store()
            .category_by_id(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("category {}", id)))?;
        self.category_dto(&category, locale).await
    }

    /// Number of products directly in the category
    pub async fn category_product_count(&self, category_id: i64) -> ContentResult<u64> {
        Ok(self
            .store()
            .count_products(&ProductFilter::in_category(category_id))
            .await?)
    }

    async fn category_dto(
        &self,
        category: &Category,
        locale: &Locale,
    ) -> ContentResult<CategoryDto> {
        let children = try_join_all(category.children.iter().map(|child| async move {
            Ok::<_, ContentError>(CategoryDto {
                product_count: self.category_product_count(child.id).await?,
                ..self.category_fields(child, locale)
            })
        }))
        .await?;

        Ok(CategoryDto {
            product_count: self.category_product_count(category.id).await?,
            children,
            ..self.category_fields(category, locale)
        })
    }

    fn category_fields(&self, category: &Category, locale: &Locale) -> CategoryDto {
        let translation = self.pick(&category.translations, locale);
        CategoryDto {
            id: category.id,
            name: translation.map(|t| t.name.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            slug: category.slug.clone(),
            parent_id: category.parent_id,
            sort_order: category.sort_order,
            product_count: 0,
            children: Vec::new(),
        }
    }
}

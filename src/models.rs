//! Persistence-side entities.
//!
//! Each translatable entity carries every stored translation (all locales);
//! choosing which one to render happens in the service layer. At most one
//! translation exists per (entity, locale) pair.

use crate::i18n::Translation;
use chrono::{DateTime, Utc};

macro_rules! impl_translation {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Translation for $ty {
                fn locale(&self) -> &str {
                    &self.locale
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTranslation {
    pub locale: String,
    pub title: String,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub translations: Vec<PageTranslation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTranslation {
    pub locale: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    /// Assigned at creation and never recomputed from translation text
    pub slug: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub translations: Vec<CategoryTranslation>,
    /// One level of children; empty when not loaded
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductTranslation {
    pub locale: String,
    pub name: String,
    pub description: String,
    pub short_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecTranslation {
    pub locale: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSpec {
    pub id: i64,
    pub product_id: i64,
    pub sort_order: i32,
    pub translations: Vec<SpecTranslation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub sku: String,
    pub image_url: String,
    pub file_url: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub translations: Vec<ProductTranslation>,
    /// Ordered by spec sort order
    pub specs: Vec<ProductSpec>,
    pub category_translations: Vec<CategoryTranslation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsTranslation {
    pub locale: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct News {
    pub id: i64,
    pub image_url: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub translations: Vec<NewsTranslation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTranslation {
    pub locale: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub file_url: String,
    /// e.g. "certificate", "gost", "reference"
    pub doc_type: String,
    pub created_at: DateTime<Utc>,
    pub translations: Vec<DocumentTranslation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactTranslation {
    pub locale: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: i64,
    /// e.g. "phone", "email", "address", "map"
    pub contact_type: String,
    pub value: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub translations: Vec<ContactTranslation>,
}

/// A category ready to be stored; `slug` is already derived and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub parent_id: Option<i64>,
    pub slug: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub translations: Vec<CategoryTranslation>,
}

/// A contact-form submission ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Always false on intake; flipped by back-office tooling
    pub processed: bool,
}

impl_translation!(
    PageTranslation,
    CategoryTranslation,
    ProductTranslation,
    SpecTranslation,
    NewsTranslation,
    DocumentTranslation,
    ContactTranslation,
);

// ==================== Builders ====================
//
// Used to seed the in-memory store; every field not set here keeps an
// empty/zero value and `created_at` defaults to now.

impl Page {
    pub fn new(id: i64, slug: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            slug: slug.to_string(),
            template: "default".to_string(),
            created_at: now,
            updated_at: now,
            translations: Vec::new(),
        }
    }

    pub fn with_translation(mut self, locale: &str, title: &str, content: &str) -> Self {
        self.translations.push(PageTranslation {
            locale: locale.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            meta_title: title.to_string(),
            meta_description: String::new(),
        });
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }
}

impl Category {
    pub fn new(id: i64, slug: &str) -> Self {
        Self {
            id,
            parent_id: None,
            slug: slug.to_string(),
            sort_order: 0,
            created_at: Utc::now(),
            translations: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_translation(mut self, locale: &str, name: &str, description: &str) -> Self {
        self.translations.push(CategoryTranslation {
            locale: locale.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        });
        self
    }
}

impl Product {
    pub fn new(id: i64, category_id: i64, sku: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            category_id,
            sku: sku.to_string(),
            image_url: String::new(),
            file_url: String::new(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
            translations: Vec::new(),
            specs: Vec::new(),
            category_translations: Vec::new(),
        }
    }

    pub fn with_translation(
        mut self,
        locale: &str,
        name: &str,
        description: &str,
        short_description: &str,
    ) -> Self {
        self.translations.push(ProductTranslation {
            locale: locale.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            short_description: short_description.to_string(),
        });
        self
    }

    pub fn with_spec(mut self, spec: ProductSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn with_image(mut self, image_url: &str) -> Self {
        self.image_url = image_url.to_string();
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }
}

impl ProductSpec {
    pub fn new(id: i64, product_id: i64, sort_order: i32) -> Self {
        Self {
            id,
            product_id,
            sort_order,
            translations: Vec::new(),
        }
    }

    pub fn with_translation(mut self, locale: &str, name: &str, value: &str) -> Self {
        self.translations.push(SpecTranslation {
            locale: locale.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

impl News {
    pub fn new(id: i64, published: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            image_url: String::new(),
            published,
            created_at: now,
            updated_at: now,
            translations: Vec::new(),
        }
    }

    pub fn with_translation(
        mut self,
        locale: &str,
        title: &str,
        content: &str,
        excerpt: &str,
    ) -> Self {
        self.translations.push(NewsTranslation {
            locale: locale.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            excerpt: excerpt.to_string(),
        });
        self
    }

    pub fn with_image(mut self, image_url: &str) -> Self {
        self.image_url = image_url.to_string();
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }
}

impl Document {
    pub fn new(id: i64, doc_type: &str, file_url: &str) -> Self {
        Self {
            id,
            file_url: file_url.to_string(),
            doc_type: doc_type.to_string(),
            created_at: Utc::now(),
            translations: Vec::new(),
        }
    }

    pub fn with_translation(mut self, locale: &str, title: &str, description: &str) -> Self {
        self.translations.push(DocumentTranslation {
            locale: locale.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

impl Contact {
    pub fn new(id: i64, contact_type: &str, value: &str) -> Self {
        Self {
            id,
            contact_type: contact_type.to_string(),
            value: value.to_string(),
            sort_order: 0,
            created_at: Utc::now(),
            translations: Vec::new(),
        }
    }

    pub fn with_label(mut self, locale: &str, label: &str) -> Self {
        self.translations.push(ContactTranslation {
            locale: locale.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

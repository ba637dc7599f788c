//! HTTP routes: thin handlers mapping URLs onto `SiteService` operations.
//!
//! Locale-prefixed routes serve the site (`/{locale}/...`), `/api/{locale}/...`
//! serves the search box and the catalog filter. Errors are rendered as
//! `{"error": code, "message": text}`.

use crate::catalog::ProductFilterParams;
use crate::dto::{
    CategoryDto, CategoryListing, ContactDto, DocumentDto, FeedbackReceipt, Listing, NewsDto,
    PageDto, ProductDto, SearchResult,
};
use crate::error::ContentError;
use crate::feedback::FeedbackRequest;
use crate::i18n::LocaleConfig;
use crate::query::{Pagination, DEFAULT_PAGE_SIZE};
use crate::service::SiteService;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

type ApiResult<T> = Result<Json<T>, ContentError>;

pub fn build_router(service: SiteService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(languages))
        .route("/api/:locale/search", get(api_search))
        .route("/api/:locale/products/filter", get(api_filter_products))
        .route("/api/:locale/feedback", post(submit_feedback))
        .route("/:locale/page/:slug", get(page))
        .route("/:locale/about", get(about_page))
        .route("/:locale/certificates", get(certificates_page))
        .route("/:locale/privacy", get(privacy_page))
        .route("/:locale/categories", get(categories))
        .route("/:locale/products", get(products))
        .route("/:locale/products/:category", get(products_by_category))
        .route("/:locale/product/:id", get(product))
        .route("/:locale/product/:id/related", get(related_products))
        .route("/:locale/news", get(news))
        .route("/:locale/news/:id", get(news_item))
        .route("/:locale/documents", get(documents))
        .route("/:locale/contacts", get(contacts))
        .route("/:locale/search", get(search))
        .route("/:locale/sitemap.xml", get(sitemap))
        .route("/:locale/feedback", post(submit_feedback))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// ==================== Errors ====================

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        let status = match &self {
            ContentError::NotFound(_) => StatusCode::NOT_FOUND,
            ContentError::Validation(_) => StatusCode::BAD_REQUEST,
            ContentError::Storage(e) => {
                warn!("Storage error while serving request: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        json_error(status, self.code(), self.to_string())
    }
}

// ==================== Query Parameters ====================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListParams {
    offset: i64,
    limit: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE as i64,
        }
    }
}

impl ListParams {
    fn page(&self) -> Pagination {
        Pagination::clamped(self.offset, self.limit)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchParams {
    q: String,
    limit: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TypeParams {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterParams {
    category_id: i64,
    search: String,
    sort_by: String,
    sort_order: String,
    offset: i64,
    limit: i64,
}

// ==================== Handlers ====================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn languages(State(service): State<SiteService>) -> Json<Vec<&'static LocaleConfig>> {
    Json(service.available_languages())
}

async fn page(
    State(service): State<SiteService>,
    Path((raw_locale, slug)): Path<(String, String)>,
) -> ApiResult<PageDto> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.page_by_slug(&locale, &slug).await?))
}

async fn fixed_page(service: &SiteService, raw_locale: &str, slug: &str) -> ApiResult<PageDto> {
    let locale = service.locale(raw_locale)?;
    Ok(Json(service.page_by_slug(&locale, slug).await?))
}

async fn about_page(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
) -> ApiResult<PageDto> {
    fixed_page(&service, &raw_locale, "about").await
}

async fn certificates_page(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
) -> ApiResult<PageDto> {
    fixed_page(&service, &raw_locale, "certificates").await
}

async fn privacy_page(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
) -> ApiResult<PageDto> {
    fixed_page(&service, &raw_locale, "privacy").await
}

async fn categories(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
) -> ApiResult<Vec<CategoryDto>> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.list_root_categories(&locale).await?))
}

async fn products(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<ProductDto>> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.list_products(&locale, params.page()).await?))
}

async fn products_by_category(
    State(service): State<SiteService>,
    Path((raw_locale, category)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> ApiResult<CategoryListing> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(
        service
            .products_by_category_slug(&locale, &category, params.page())
            .await?,
    ))
}

async fn product(
    State(service): State<SiteService>,
    Path((raw_locale, id)): Path<(String, i64)>,
) -> ApiResult<ProductDto> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.product(&locale, id).await?))
}

async fn related_products(
    State(service): State<SiteService>,
    Path((raw_locale, id)): Path<(String, i64)>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<ProductDto>> {
    let locale = service.locale(&raw_locale)?;
    let limit = params.page().limit.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(service.related_products(&locale, id, limit).await?))
}

async fn news(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<NewsDto>> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.list_news(&locale, params.page()).await?))
}

async fn news_item(
    State(service): State<SiteService>,
    Path((raw_locale, id)): Path<(String, i64)>,
) -> ApiResult<NewsDto> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.news_item(&locale, id).await?))
}

async fn documents(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<TypeParams>,
) -> ApiResult<Vec<DocumentDto>> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.documents_by_type(&locale, &params.kind).await?))
}

async fn contacts(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<TypeParams>,
) -> ApiResult<Vec<ContactDto>> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.contacts_by_type(&locale, &params.kind).await?))
}

async fn search(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<SearchResult>> {
    let locale = service.locale(&raw_locale)?;
    Ok(Json(service.search_all(&locale, &params.q).await.value))
}

async fn api_search(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<SearchResult>> {
    let locale = service.locale(&raw_locale)?;
    let limit = Pagination::clamped(0, params.limit)
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE) as usize;
    Ok(Json(service.search_api(&locale, &params.q, limit).await.value))
}

async fn api_filter_products(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Listing<ProductDto>> {
    let locale = service.locale(&raw_locale)?;
    let page = Pagination::clamped(params.offset, params.limit);
    let filter = ProductFilterParams {
        category_id: params.category_id,
        search: params.search,
        sort_by: params.sort_by,
        sort_order: params.sort_order,
    };
    Ok(Json(service.filter_products(&locale, &filter, page).await?))
}

async fn submit_feedback(
    State(service): State<SiteService>,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<FeedbackReceipt> {
    request.validate()?;
    let id = service.save_feedback(request).await?;
    Ok(Json(FeedbackReceipt { id }))
}

async fn sitemap(
    State(service): State<SiteService>,
    Path(raw_locale): Path<String>,
) -> Result<Response, ContentError> {
    let locale = service.locale(&raw_locale)?;
    let sitemap = service.sitemap(&locale).await;
    Ok(([(header::CONTENT_TYPE, "application/xml")], sitemap.value).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ContentError::not_found("page 'x'").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ContentError::validation("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ContentError::from(sqlx::Error::PoolTimedOut)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_list_params_default_page() {
        assert_eq!(ListParams::default().page(), Pagination::default());
    }
}

use thiserror::Error;

/// Errors surfaced by core operations.
///
/// Lookups that miss (unknown id, unknown slug, unpublished news) are
/// `NotFound`, never `Storage`, even though the store reports them as an
/// empty result.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ContentError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Storage(_) => "storage_error",
        }
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

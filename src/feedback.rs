//! Contact-form intake.

use crate::error::{ContentError, ContentResult};
use crate::models::NewFeedback;
use crate::service::SiteService;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

/// Contact-form submission as sent by the site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub message: String,
}

impl FeedbackRequest {
    /// Name and message are required; everything else is optional.
    pub fn validate(&self) -> ContentResult<()> {
        let missing: Vec<&str> = [("name", &self.name), ("message", &self.message)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContentError::validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

impl SiteService {
    /// Store a submission and return its id.
    ///
    /// Callers validate the request first; every submission that reaches
    /// this point is stored, unprocessed, with the current time.
    pub async fn save_feedback(&self, request: FeedbackRequest) -> ContentResult<i64> {
        let feedback = NewFeedback {
            name: request.name,
            email: request.email,
            phone: request.phone,
            company: request.company,
            message: request.message,
            created_at: Utc::now(),
            processed: false,
        };
        let id = self.store().insert_feedback(&feedback).await?;
        info!("✓ Stored feedback #{}", id);
        Ok(id)
    }
}

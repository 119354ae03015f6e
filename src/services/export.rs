//! Export payloads: the `.rules` file and the JSON project document.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDateTime;

use crate::errors::AppError;
use crate::models::project::ProjectDocument;
use crate::models::rule::RuleRecord;
use crate::services::serializer;

pub const RULES_FILENAME: &str = "snortforge_rules.rules";
pub const PROJECT_FILENAME: &str = "snortforge_project.json";

/// A downloadable file body.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.filename),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Render the `.rules` download. An empty list is rejected.
pub fn rules_file(rules: &[RuleRecord], now: NaiveDateTime) -> Result<Attachment, AppError> {
    if rules.is_empty() {
        return Err(AppError::Validation("No rules to export".to_string()));
    }
    tracing::info!(rule_count = rules.len(), "Exporting rules file");
    Ok(Attachment {
        filename: RULES_FILENAME,
        content_type: "text/plain",
        body: serializer::render_rules_file(rules, now),
    })
}

/// Render the JSON project download. An empty project is allowed.
pub fn project_file(rules: Vec<RuleRecord>, now: NaiveDateTime) -> Result<Attachment, AppError> {
    let doc = ProjectDocument::new(rules, now);
    let body = serde_json::to_string_pretty(&doc)
        .map_err(|e| AppError::Internal(format!("Failed to serialize project: {e}")))?;
    tracing::info!(rule_count = doc.rule_count, "Exporting project file");
    Ok(Attachment {
        filename: PROJECT_FILENAME,
        content_type: "application/json",
        body,
    })
}

//! Stateless export endpoints: the client posts the rules to download.

use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::rule::RuleRecord;
use crate::services::export::{self, Attachment};

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

/// POST /api/v1/export/rules — download the posted rules as a `.rules` file.
pub async fn rules(Json(req): Json<ExportRequest>) -> Result<Attachment, AppError> {
    export::rules_file(&req.rules, chrono::Local::now().naive_local())
}

/// POST /api/v1/export/json — download the posted rules as a JSON project.
pub async fn json(Json(req): Json<ExportRequest>) -> Result<Attachment, AppError> {
    export::project_file(req.rules, chrono::Local::now().naive_local())
}

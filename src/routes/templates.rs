//! Built-in template catalog endpoints.

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::models::template::TemplateSummary;
use crate::services::templates;

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateCatalog {
    pub categories: Vec<String>,
    pub templates: Vec<TemplateSummary>,
}

/// GET /api/v1/templates — list templates, optionally filtered by category.
pub async fn list(
    Query(query): Query<TemplateQuery>,
) -> Result<Json<ApiResponse<TemplateCatalog>>, AppError> {
    Ok(ApiResponse::success(TemplateCatalog {
        categories: templates::categories(),
        templates: templates::list(query.category.as_deref()),
    }))
}

/// GET /api/v1/templates/{name} — one template with its rendered rule.
pub async fn get_by_name(
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<TemplateSummary>>, AppError> {
    let template = templates::get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Template '{name}' not found")))?;
    Ok(ApiResponse::success(TemplateSummary::from(template)))
}

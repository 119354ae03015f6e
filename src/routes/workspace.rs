//! Workspace endpoints: the server-held rule collection and its selection.
//!
//! Each handler takes the workspace lock once and finishes its mutation
//! before releasing it. Uploads are parsed before the lock is taken.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::models::form::FormState;
use crate::models::rule::RuleRecord;
use crate::parsers::InputFormat;
use crate::routes::import::{self, ImportResult};
use crate::services::collection::{CollisionReport, Gate, RuleCollection};
use crate::services::export::{self, Attachment};
use crate::services::{loader, serializer, templates};
use crate::AppState;

/// One row of the workspace table.
#[derive(Debug, Serialize)]
pub struct WorkspaceEntry {
    pub index: usize,
    pub selected: bool,
    pub rule_text: String,
    pub rule: RuleRecord,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceView {
    pub count: usize,
    /// Rules with a message.
    pub valid: usize,
    pub invalid: usize,
    pub selection: Vec<usize>,
    pub preview_index: Option<usize>,
    pub rules: Vec<WorkspaceEntry>,
}

impl From<&RuleCollection> for WorkspaceView {
    fn from(collection: &RuleCollection) -> Self {
        let selection = collection.selection();
        let rules = collection
            .rules()
            .iter()
            .enumerate()
            .map(|(index, rule)| WorkspaceEntry {
                index,
                selected: selection.contains(&index),
                rule_text: serializer::encode(rule),
                rule: rule.clone(),
            })
            .collect();
        let valid = collection
            .rules()
            .iter()
            .filter(|r| !r.msg.is_empty())
            .count();
        Self {
            count: collection.len(),
            valid,
            invalid: collection.len() - valid,
            selection,
            preview_index: collection.preview_index(),
            rules,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Appended {
    pub index: usize,
    pub rule_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub indices: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SelectAllRequest {
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectionView {
    pub selection: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct Toggled {
    pub index: usize,
    pub selected: bool,
    pub selection: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct Duplicated {
    pub sids: Vec<u32>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub removed: usize,
    pub remaining: usize,
}

#[derive(Debug, Serialize)]
pub struct Preview {
    pub index: usize,
    pub rule_text: String,
}

/// Whole workspace as canonical text, for copying.
#[derive(Debug, Serialize)]
pub struct WorkspaceText {
    pub count: usize,
    pub rule_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_export_format")]
    pub format: InputFormat,
}

fn default_export_format() -> InputFormat {
    InputFormat::Rules
}

/// GET /api/v1/workspace — every rule with its text, plus the selection.
pub async fn get_workspace(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WorkspaceView>>, AppError> {
    let workspace = state.workspace.lock().await;
    Ok(ApiResponse::success(WorkspaceView::from(&*workspace)))
}

/// POST /api/v1/workspace/rules — add the builder form as a new rule (message required).
pub async fn add_rule(
    State(state): State<AppState>,
    Json(form): Json<FormState>,
) -> Result<Json<ApiResponse<Appended>>, AppError> {
    let record = form.accept()?;
    let rule_text = serializer::encode(&record);
    let index = state
        .workspace
        .lock()
        .await
        .append(record, Gate::Enforced)?;
    tracing::info!(index, "Added rule to workspace");
    Ok(ApiResponse::success(Appended { index, rule_text }))
}

/// POST /api/v1/workspace/templates/{name} — append a built-in template as-is.
pub async fn add_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Appended>>, AppError> {
    let template = templates::get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Template '{name}' not found")))?;
    let record = template.rule.clone();
    let rule_text = serializer::encode(&record);
    let index = state
        .workspace
        .lock()
        .await
        .append(record, Gate::Trusted)?;
    tracing::info!(index, template = %name, "Added template to workspace");
    Ok(ApiResponse::success(Appended { index, rule_text }))
}

/// POST /api/v1/workspace/import — parse an upload and append its rules (multipart `file`, optional `format`).
pub async fn import_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let upload = import::read_upload(multipart).await?;
    let result = import::parse_upload(&upload, upload.resolved_format())?;
    let summary = ImportResult::from(result);

    let added = state.workspace.lock().await.extend(summary.rules.clone());
    tracing::info!(added, skipped = summary.errors.len(), "Imported rules into workspace");
    Ok(ApiResponse::success(summary))
}

/// POST /api/v1/workspace/selection — replace the selection.
pub async fn select(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ApiResponse<SelectionView>>, AppError> {
    let mut workspace = state.workspace.lock().await;
    workspace.select(&req.indices)?;
    Ok(ApiResponse::success(SelectionView {
        selection: workspace.selection(),
    }))
}

/// POST /api/v1/workspace/selection/{index} — flip one row's checkbox.
pub async fn toggle(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<Toggled>>, AppError> {
    let mut workspace = state.workspace.lock().await;
    let selected = workspace.toggle(index)?;
    Ok(ApiResponse::success(Toggled {
        index,
        selected,
        selection: workspace.selection(),
    }))
}

/// POST /api/v1/workspace/selection/all — the select-all checkbox.
pub async fn select_all(
    State(state): State<AppState>,
    Json(req): Json<SelectAllRequest>,
) -> Result<Json<ApiResponse<SelectionView>>, AppError> {
    let mut workspace = state.workspace.lock().await;
    workspace.select_all(req.checked);
    Ok(ApiResponse::success(SelectionView {
        selection: workspace.selection(),
    }))
}

/// DELETE /api/v1/workspace/selection — clear the selection.
pub async fn clear_selection(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SelectionView>>, AppError> {
    let mut workspace = state.workspace.lock().await;
    workspace.clear_selection();
    Ok(ApiResponse::success(SelectionView {
        selection: workspace.selection(),
    }))
}

/// POST /api/v1/workspace/duplicate — copy the selected rules with fresh sids.
pub async fn duplicate(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Duplicated>>, AppError> {
    let sids = state.workspace.lock().await.duplicate()?;
    tracing::info!(count = sids.len(), "Duplicated workspace rules");
    Ok(ApiResponse::success(Duplicated {
        count: sids.len(),
        sids,
    }))
}

/// POST /api/v1/workspace/delete — remove the selected rules.
pub async fn delete_selected(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    let mut workspace = state.workspace.lock().await;
    let removed = workspace.delete_selected()?;
    tracing::info!(removed, "Deleted workspace rules");
    Ok(ApiResponse::success(Deleted {
        removed,
        remaining: workspace.len(),
    }))
}

/// GET /api/v1/workspace/edit — the single selected rule as builder form state.
pub async fn edit_target(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FormState>>, AppError> {
    let workspace = state.workspace.lock().await;
    let form = loader::decode(workspace.edit_target()?);
    Ok(ApiResponse::success(form))
}

/// GET /api/v1/workspace/rules/{index}/preview — canonical text of one rule.
pub async fn preview(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<Preview>>, AppError> {
    let rule_text = state.workspace.lock().await.preview(index)?;
    Ok(ApiResponse::success(Preview { index, rule_text }))
}

/// GET /api/v1/workspace/collisions — sids and detection logic used more than once.
pub async fn collisions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CollisionReport>>, AppError> {
    let report = state.workspace.lock().await.collisions();
    Ok(ApiResponse::success(report))
}

/// GET /api/v1/workspace/text — every rule as canonical text, one per line.
pub async fn text(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WorkspaceText>>, AppError> {
    let workspace = state.workspace.lock().await;
    Ok(ApiResponse::success(WorkspaceText {
        count: workspace.len(),
        rule_text: serializer::encode_all(workspace.rules()),
    }))
}

/// GET /api/v1/workspace/export?format=rules|json — download the whole workspace.
pub async fn export_workspace(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Attachment, AppError> {
    let rules = state.workspace.lock().await.rules().to_vec();
    let now = chrono::Local::now().naive_local();
    match query.format {
        InputFormat::Rules => export::rules_file(&rules, now),
        InputFormat::Json => export::project_file(rules, now),
    }
}

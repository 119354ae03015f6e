//! Import endpoints: parse an uploaded file and return its rules without
//! touching the workspace.

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::models::rule::RuleRecord;
use crate::parsers::{self, InputFormat, ParseResult};

/// Parsed upload as returned to the client.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub count: usize,
    pub rules: Vec<RuleRecord>,
    pub errors: Vec<String>,
}

impl From<ParseResult> for ImportResult {
    fn from(result: ParseResult) -> Self {
        Self {
            count: result.rules.len(),
            errors: result.errors.iter().map(ToString::to_string).collect(),
            rules: result.rules,
        }
    }
}

/// File and optional format read from a multipart upload.
pub(crate) struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub format: Option<InputFormat>,
}

impl Upload {
    /// Explicit `format` field wins; otherwise `.json` files are projects and
    /// everything else is rule text.
    pub fn resolved_format(&self) -> InputFormat {
        self.format.unwrap_or_else(|| {
            if self.file_name.to_ascii_lowercase().ends_with(".json") {
                InputFormat::Json
            } else {
                InputFormat::Rules
            }
        })
    }
}

/// Body-limit overruns keep their 413; anything else is a bad upload.
fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

/// Pull the `file` (and optional `format`) fields out of a multipart request.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut format: Option<InputFormat> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Multipart error"))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                if file_name.is_empty() {
                    return Err(AppError::Validation("No file selected".to_string()));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file"))?
                    .to_vec();
                file = Some((file_name, data));
            }
            "format" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read format: {e}")))?;
                format = Some(
                    serde_json::from_value(serde_json::Value::String(text.clone())).map_err(
                        |_| {
                            AppError::Validation(format!(
                                "Invalid format '{text}'. Supported: rules, json"
                            ))
                        },
                    )?,
                );
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    Ok(Upload {
        file_name,
        data,
        format,
    })
}

/// Run the parser for `format` over an upload.
pub(crate) fn parse_upload(upload: &Upload, format: InputFormat) -> Result<ParseResult, AppError> {
    let parser = parsers::for_format(format);
    let result = parser
        .parse(&upload.data)
        .map_err(|e| AppError::Validation(format!("{e:#}")))?;
    tracing::info!(
        file_name = %upload.file_name,
        format = ?parser.format(),
        rules = result.rules.len(),
        errors = result.errors.len(),
        "Parsed uploaded file"
    );
    Ok(result)
}

/// POST /api/v1/import/rules — parse an uploaded `.rules` file (multipart `file`).
pub async fn rules(multipart: Multipart) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let upload = read_upload(multipart).await?;
    let result = parse_upload(&upload, InputFormat::Rules)?;
    Ok(ApiResponse::success(result.into()))
}

/// POST /api/v1/import/json — parse an uploaded JSON project (multipart `file`).
pub async fn json(multipart: Multipart) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let upload = read_upload(multipart).await?;
    let result = parse_upload(&upload, InputFormat::Json)?;
    Ok(ApiResponse::success(result.into()))
}

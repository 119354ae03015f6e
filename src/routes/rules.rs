//! Rule builder endpoints: render and validate a single rule.

use axum::Json;
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::models::rule::RuleRecord;
use crate::services::validator::{self, ValidationReport};

#[derive(Debug, Serialize)]
pub struct BuiltRule {
    pub rule_text: String,
}

#[derive(Debug, Serialize)]
pub struct ValidatedRule {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub rule_text: String,
}

/// POST /api/v1/rules/build — render a rule as canonical text.
pub async fn build(
    Json(rule): Json<RuleRecord>,
) -> Result<Json<ApiResponse<BuiltRule>>, AppError> {
    Ok(ApiResponse::success(BuiltRule {
        rule_text: rule.to_string(),
    }))
}

/// POST /api/v1/rules/validate — check a rule and return errors, warnings and its text.
pub async fn validate(
    Json(rule): Json<RuleRecord>,
) -> Result<Json<ApiResponse<ValidatedRule>>, AppError> {
    let report = validator::validate_rule(&rule);
    tracing::debug!(
        sid = rule.sid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Validated rule"
    );
    Ok(ApiResponse::success(ValidatedRule {
        report,
        rule_text: rule.to_string(),
    }))
}

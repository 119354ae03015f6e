//! JSON project document exchanged by the export and import endpoints.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::rule::RuleRecord;

pub const PROJECT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectDocument {
    pub snortforge_version: String,
    pub exported: NaiveDateTime,
    pub rule_count: usize,
    pub rules: Vec<RuleRecord>,
}

impl ProjectDocument {
    pub fn new(rules: Vec<RuleRecord>, exported: NaiveDateTime) -> Self {
        Self {
            snortforge_version: PROJECT_VERSION.to_string(),
            exported,
            rule_count: rules.len(),
            rules,
        }
    }
}

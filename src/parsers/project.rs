//! JSON project parser.
//!
//! Accepts the exported project document or a bare array of rule objects.
//! Each entry is converted on its own, so one bad record does not discard
//! the rest of the project.

use anyhow::{bail, Context};
use serde_json::Value;

use crate::models::rule::RuleRecord;
use crate::parsers::{InputFormat, ParseError, ParseResult, Parser, RecordKind};

#[derive(Debug, Default)]
pub struct ProjectParser;

impl ProjectParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for ProjectParser {
    fn parse(&self, data: &[u8]) -> Result<ParseResult, anyhow::Error> {
        let doc: Value = serde_json::from_slice(data).context("Invalid JSON project file")?;

        let entries = match doc {
            Value::Array(entries) => entries,
            Value::Object(mut map) => {
                if let Some(version) = map.get("snortforge_version").and_then(Value::as_str) {
                    tracing::debug!(version, "Reading project document");
                }
                match map.remove("rules") {
                    Some(Value::Array(entries)) => entries,
                    None | Some(Value::Null) => Vec::new(),
                    Some(_) => bail!("Project 'rules' must be an array"),
                }
            }
            _ => bail!("Project file must be a JSON object or array"),
        };

        let mut result = ParseResult::default();
        for (i, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<RuleRecord>(entry) {
                Ok(rule) => result.rules.push(rule),
                Err(e) => result.errors.push(ParseError {
                    kind: RecordKind::Rule,
                    record_index: i + 1,
                    message: e.to_string(),
                }),
            }
        }

        tracing::debug!(
            rules = result.rules.len(),
            errors = result.errors.len(),
            "Parsed project file"
        );
        Ok(result)
    }

    fn format(&self) -> InputFormat {
        InputFormat::Json
    }
}

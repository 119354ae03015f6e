//! Import parsers turning uploaded files into rule records.
//!
//! Each parser implements the `Parser` trait. Problems with individual
//! records are collected as `ParseError`s; only an unreadable file as a
//! whole fails the parse.

pub mod project;
pub mod rule_text;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::rule::RuleRecord;

/// Result of parsing an uploaded file.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub rules: Vec<RuleRecord>,
    pub errors: Vec<ParseError>,
}

/// Where in the input a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// 1-based line of a rules file.
    Line,
    /// 1-based position in a project's rule list.
    Rule,
}

/// Error encountered while parsing an individual record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: RecordKind,
    pub record_index: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            RecordKind::Line => "Line",
            RecordKind::Rule => "Rule",
        };
        write!(f, "{label} {}: {}", self.record_index, self.message)
    }
}

/// Input format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Canonical rule text, one rule per line.
    Rules,
    /// JSON project document.
    Json,
}

/// Trait for pluggable import parsers.
pub trait Parser: Send + Sync {
    /// Parse raw file contents into rule records.
    fn parse(&self, data: &[u8]) -> Result<ParseResult, anyhow::Error>;

    /// The input format this parser handles.
    fn format(&self) -> InputFormat;
}

/// Parser for the given input format.
pub fn for_format(format: InputFormat) -> Box<dyn Parser> {
    match format {
        InputFormat::Rules => Box::new(rule_text::RuleTextParser::new()),
        InputFormat::Json => Box::new(project::ProjectParser::new()),
    }
}

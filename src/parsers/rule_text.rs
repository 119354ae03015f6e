//! Canonical rule text parser.
//!
//! Reads `.rules` files: one rule per line, blank lines and `#` comments
//! skipped. Each rule is seven header tokens followed by a parenthesized,
//! semicolon-separated option list. Unknown option keywords are ignored and
//! numeric options that fail to parse keep their default.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::rule::{RuleRecord, UnknownKeyword};
use crate::parsers::{InputFormat, ParseError, ParseResult, Parser, RecordKind};

static RULE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+\s+\S+\s+\S+\s+\S+\s+\S+\s+\S+\s+\S+)\s*\((.+)\)\s*$")
        .expect("rule shape pattern is a valid regex")
});

/// Why a single line could not be read as a rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleSyntaxError {
    #[error("Empty or commented rule.")]
    Empty,

    #[error("Could not parse rule structure.")]
    Structure,

    #[error(transparent)]
    Keyword(#[from] UnknownKeyword),
}

/// Parser for canonical rule text files.
#[derive(Debug, Default)]
pub struct RuleTextParser;

impl RuleTextParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for RuleTextParser {
    fn parse(&self, data: &[u8]) -> Result<ParseResult, anyhow::Error> {
        let text = String::from_utf8_lossy(data);
        let mut result = ParseResult::default();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_rule(line) {
                Ok(rule) => result.rules.push(rule),
                Err(e) => result.errors.push(ParseError {
                    kind: RecordKind::Line,
                    record_index: i + 1,
                    message: e.to_string(),
                }),
            }
        }

        tracing::debug!(
            rules = result.rules.len(),
            errors = result.errors.len(),
            "Parsed rules file"
        );
        Ok(result)
    }

    fn format(&self) -> InputFormat {
        InputFormat::Rules
    }
}

/// Parse one line of rule text into a record.
pub fn parse_rule(line: &str) -> Result<RuleRecord, RuleSyntaxError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Err(RuleSyntaxError::Empty);
    }

    let caps = RULE_SHAPE.captures(line).ok_or(RuleSyntaxError::Structure)?;
    let header: Vec<&str> = caps[1].split_whitespace().collect();
    let [action, protocol, src_ip, src_port, direction, dst_ip, dst_port] = header[..] else {
        return Err(RuleSyntaxError::Structure);
    };

    let mut rule = RuleRecord {
        action: action.parse()?,
        protocol: protocol.parse()?,
        src_ip: src_ip.to_string(),
        src_port: src_port.to_string(),
        direction: direction.parse()?,
        dst_ip: dst_ip.to_string(),
        dst_port: dst_port.to_string(),
        ..Default::default()
    };

    for option in split_options(&caps[2]) {
        let option = option.trim();
        if option.is_empty() {
            continue;
        }
        let (key, value) = match option.split_once(':') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (option, ""),
        };
        apply_option(key, value, &mut rule);
    }

    Ok(rule)
}

/// Split an option body on `;` outside double quotes. `\"` does not toggle quoting.
fn split_options(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in body.chars() {
        match ch {
            '"' if !current.ends_with('\\') => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn apply_option(key: &str, value: &str, rule: &mut RuleRecord) {
    let value = value.trim_matches('"').trim_matches('\'');
    match key {
        "msg" => rule.msg = value.to_string(),
        "sid" => set_number(&mut rule.sid, value),
        "rev" => set_number(&mut rule.rev, value),
        "priority" => set_number(&mut rule.priority, value),
        "depth" => set_number(&mut rule.depth, value),
        "offset" => set_number(&mut rule.offset, value),
        "distance" => set_number(&mut rule.distance, value),
        "within" => set_number(&mut rule.within, value),
        "classtype" => rule.classtype = value.to_string(),
        "reference" => rule.reference = value.to_string(),
        "metadata" => rule.metadata = value.to_string(),
        "pcre" => rule.pcre = value.to_string(),
        "flow" => rule.flow = value.to_string(),
        "content" => match value.strip_prefix('!') {
            Some(rest) => {
                rule.content_negated = true;
                rule.content = rest.trim_matches('"').to_string();
            }
            None => rule.content = value.to_string(),
        },
        "nocase" => rule.content_nocase = true,
        "threshold" => apply_threshold(value, rule),
        _ => {}
    }
}

/// `type <t>, track <trk>, count <c>, seconds <s>`; malformed parts are skipped.
fn apply_threshold(value: &str, rule: &mut RuleRecord) {
    for part in value.split(',') {
        let words: Vec<&str> = part.split_whitespace().collect();
        let [key, val] = words[..] else {
            continue;
        };
        match key {
            "type" => rule.threshold_type = val.parse().ok(),
            "track" => rule.threshold_track = val.parse().ok(),
            "count" => set_number(&mut rule.threshold_count, val),
            "seconds" => set_number(&mut rule.threshold_seconds, val),
            _ => {}
        }
    }
}

fn set_number(field: &mut u32, value: &str) {
    if let Ok(n) = value.parse() {
        *field = n;
    }
}

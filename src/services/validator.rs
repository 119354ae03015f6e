//! Rule validation: structural and best-practice checks reported as errors and warnings.
//!
//! Action, protocol and direction are already constrained by their types, so
//! the checks here cover the free-text fields.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::rule::{Protocol, RuleRecord};

/// Custom rules should use sids at or above this value.
pub const RESERVED_SID_LIMIT: u32 = 1_000_000;

pub const VALID_CLASSTYPES: &[&str] = &[
    "attempted-admin",
    "attempted-user",
    "inappropriate-content",
    "policy-violation",
    "shellcode-detect",
    "successful-admin",
    "successful-user",
    "trojan-activity",
    "unsuccessful-user",
    "web-application-attack",
    "attempted-dos",
    "attempted-recon",
    "bad-unknown",
    "default-login-attempt",
    "denial-of-service",
    "misc-attack",
    "non-standard-protocol",
    "rpc-portmap-decode",
    "successful-dos",
    "successful-recon-largescale",
    "successful-recon-limited",
    "suspicious-filename-detect",
    "suspicious-login",
    "system-call-detect",
    "unusual-client-port-connection",
    "web-application-activity",
    "icmp-event",
    "misc-activity",
    "network-scan",
    "not-suspicious",
    "protocol-command-decode",
    "string-detect",
    "unknown",
    "tcp-connection",
];

/// Every flow keyword Snort accepts, including ones the builder has no toggle for.
pub const VALID_FLOW_OPTIONS: &[&str] = &[
    "to_client",
    "to_server",
    "from_client",
    "from_server",
    "established",
    "not_established",
    "stateless",
    "no_stream",
    "only_stream",
    "no_frag",
    "only_frag",
];

static IP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(any|\$\w+|!?\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}(/\d{1,2})?|!?\[[\d\.,/\s!\$\w]+\])$",
    )
    .expect("IP pattern is a valid regex")
});

static PORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(any|\$\w+|!?\d{1,5}(:\d{1,5})?|!?\[\d{1,5}(:\d{1,5})?(,\d{1,5}(:\d{1,5})?)*\])$",
    )
    .expect("port pattern is a valid regex")
});

static HEX_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|([^|]*)\|").expect("hex block pattern is a valid regex"));

static HEX_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F\s]+$").expect("hex char pattern is a valid regex"));

/// Outcome of validating one rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate a rule and collect every error and warning.
pub fn validate_rule(rule: &RuleRecord) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_network(rule, &mut errors, &mut warnings);
    check_identity(rule, &mut errors, &mut warnings);
    check_content(rule, &mut errors, &mut warnings);
    check_flow(rule, &mut errors, &mut warnings);

    if !rule.classtype.is_empty() && !VALID_CLASSTYPES.contains(&rule.classtype.as_str()) {
        warnings.push(format!("Classtype '{}' is non-standard.", rule.classtype));
    }

    if !rule.pcre.is_empty() && (!rule.pcre.starts_with('/') || rule.pcre.matches('/').count() < 2)
    {
        errors.push("PCRE must be in format: /pattern/flags".to_string());
    }

    check_threshold(rule, &mut errors);

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_network(rule: &RuleRecord, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    for (label, value) in [("Source IP", &rule.src_ip), ("Destination IP", &rule.dst_ip)] {
        if !IP_PATTERN.is_match(value) {
            errors.push(format!("Invalid {label}: '{value}'"));
        }
    }
    for (label, value) in [
        ("Source port", &rule.src_port),
        ("Destination port", &rule.dst_port),
    ] {
        if !PORT_PATTERN.is_match(value) {
            errors.push(format!("Invalid {label}: '{value}'"));
        }
    }
    if rule.src_ip == "any" && rule.dst_ip == "any" {
        warnings.push(
            "Both source and destination IPs are 'any' — rule may be overly broad.".to_string(),
        );
    }
    if rule.src_port == "any" && rule.dst_port == "any" {
        warnings.push("Both ports are 'any' — consider narrowing scope.".to_string());
    }
}

fn check_identity(rule: &RuleRecord, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if rule.msg.is_empty() {
        errors.push("Rule message (msg) is required.".to_string());
    } else if rule.msg.chars().count() < 5 {
        warnings.push("Rule message is very short — use a descriptive message.".to_string());
    } else if rule.msg.contains('"') || rule.msg.contains(';') {
        errors.push("Message must not contain '\"' or ';' characters.".to_string());
    }

    if rule.sid == 0 {
        errors.push("SID must be >= 1.".to_string());
    } else if rule.sid < RESERVED_SID_LIMIT {
        warnings.push(format!(
            "SID {} is reserved (< 1,000,000). Custom rules should use >= 1,000,000.",
            rule.sid
        ));
    }
    if rule.rev < 1 {
        errors.push("Revision must be >= 1.".to_string());
    }
}

fn check_content(rule: &RuleRecord, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if rule.content.is_empty() && rule.pcre.is_empty() {
        warnings.push("No content or PCRE — rule matches on header only.".to_string());
    }

    if rule.content.contains('|') {
        for caps in HEX_BLOCK.captures_iter(&rule.content) {
            let part = &caps[1];
            let digits = part.chars().filter(|c| *c != ' ').count();
            if digits % 2 != 0 {
                errors.push(format!(
                    "Invalid hex: '|{part}|' — must have even number of hex chars."
                ));
            }
            if !HEX_CHARS.is_match(part) {
                errors.push(format!("Invalid hex: '|{part}|' — contains non-hex characters."));
            }
        }
    }

    if rule.depth > 0 && rule.content.is_empty() {
        errors.push("Depth requires content.".to_string());
    }
    if rule.offset > 0 && rule.content.is_empty() {
        errors.push("Offset requires content.".to_string());
    }
    if rule.depth > 0 && rule.offset >= rule.depth {
        warnings.push("Offset >= depth — content may never match.".to_string());
    }
}

fn check_flow(rule: &RuleRecord, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if !rule.flow.is_empty() {
        for part in rule.flow.split(',').map(str::trim) {
            if !VALID_FLOW_OPTIONS.contains(&part) {
                errors.push(format!("Invalid flow option '{part}'."));
            }
        }
    } else if rule.protocol == Protocol::Tcp {
        warnings.push("No flow option for TCP — consider adding 'established'.".to_string());
    }
}

fn check_threshold(rule: &RuleRecord, errors: &mut Vec<String>) {
    if rule.threshold_type.is_none() {
        return;
    }
    if rule.threshold_track.is_none() {
        errors.push("Threshold track must be 'by_src' or 'by_dst'.".to_string());
    }
    if rule.threshold_count == 0 {
        errors.push("Threshold count must be > 0.".to_string());
    }
    if rule.threshold_seconds == 0 {
        errors.push("Threshold seconds must be > 0.".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::{ThresholdTrack, ThresholdType};

    fn good_rule() -> RuleRecord {
        RuleRecord {
            src_ip: "$EXTERNAL_NET".to_string(),
            dst_ip: "$HOME_NET".to_string(),
            dst_port: "$HTTP_PORTS".to_string(),
            msg: "SQL Injection Attempt".to_string(),
            content: "UNION SELECT".to_string(),
            content_nocase: true,
            flow: "to_server,established".to_string(),
            classtype: "web-application-attack".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn clean_rule_is_valid_without_warnings() {
        let report = validate_rule(&good_rule());
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn missing_msg_is_error() {
        let report = validate_rule(&RuleRecord {
            msg: String::new(),
            ..good_rule()
        });
        assert!(!report.is_valid);
        assert!(report.errors.contains(&"Rule message (msg) is required.".to_string()));
    }

    #[test]
    fn short_msg_is_warning() {
        let report = validate_rule(&RuleRecord {
            msg: "SQL".to_string(),
            ..good_rule()
        });
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("very short")));
    }

    #[test]
    fn msg_with_semicolon_is_error() {
        let report = validate_rule(&RuleRecord {
            msg: "bad; message".to_string(),
            ..good_rule()
        });
        assert!(!report.is_valid);
    }

    #[test]
    fn address_patterns() {
        for ip in ["any", "$HOME_NET", "10.0.0.1", "!192.168.1.0/24", "[10.0.0.0/8,$DMZ]"] {
            assert!(IP_PATTERN.is_match(ip), "{ip}");
        }
        for ip in ["10.0.0", "home", "10.0.0.1/240"] {
            assert!(!IP_PATTERN.is_match(ip), "{ip}");
        }
        for port in ["any", "80", "!22", "1024:65535", "[80,443,8000:8080]", "$HTTP_PORTS"] {
            assert!(PORT_PATTERN.is_match(port), "{port}");
        }
        for port in ["http", "123456", "[80;443]"] {
            assert!(!PORT_PATTERN.is_match(port), "{port}");
        }
    }

    #[test]
    fn invalid_ip_is_error() {
        let report = validate_rule(&RuleRecord {
            dst_ip: "example.com".to_string(),
            ..good_rule()
        });
        assert_eq!(report.errors, vec!["Invalid Destination IP: 'example.com'"]);
    }

    #[test]
    fn any_any_warnings() {
        let report = validate_rule(&RuleRecord {
            src_ip: "any".to_string(),
            dst_ip: "any".to_string(),
            dst_port: "any".to_string(),
            ..good_rule()
        });
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn reserved_sid_warns_and_zero_sid_errors() {
        let report = validate_rule(&RuleRecord {
            sid: 2001,
            ..good_rule()
        });
        assert!(report.is_valid);
        assert!(report.warnings[0].starts_with("SID 2001 is reserved"));

        let report = validate_rule(&RuleRecord {
            sid: 0,
            rev: 0,
            ..good_rule()
        });
        assert!(report.errors.contains(&"SID must be >= 1.".to_string()));
        assert!(report.errors.contains(&"Revision must be >= 1.".to_string()));
    }

    #[test]
    fn hex_blocks_checked() {
        let ok = validate_rule(&RuleRecord {
            content: "|FF|SMB|00 FC|".to_string(),
            ..good_rule()
        });
        assert!(ok.is_valid, "{:?}", ok.errors);

        let odd = validate_rule(&RuleRecord {
            content: "|0 FC|".to_string(),
            ..good_rule()
        });
        assert!(odd.errors[0].contains("even number"));

        let junk = validate_rule(&RuleRecord {
            content: "|ZZ|".to_string(),
            ..good_rule()
        });
        assert!(junk.errors[0].contains("non-hex"));
    }

    #[test]
    fn flow_tokens_checked() {
        let report = validate_rule(&RuleRecord {
            flow: "established,sideways".to_string(),
            ..good_rule()
        });
        assert_eq!(report.errors, vec!["Invalid flow option 'sideways'."]);

        let report = validate_rule(&RuleRecord {
            flow: "not_established".to_string(),
            ..good_rule()
        });
        assert!(report.is_valid);
    }

    #[test]
    fn tcp_without_flow_warns() {
        let report = validate_rule(&RuleRecord {
            flow: String::new(),
            ..good_rule()
        });
        assert!(report.warnings.iter().any(|w| w.contains("No flow option")));
    }

    #[test]
    fn pcre_shape() {
        let report = validate_rule(&RuleRecord {
            pcre: "abc".to_string(),
            ..good_rule()
        });
        assert!(!report.is_valid);
        let report = validate_rule(&RuleRecord {
            pcre: "/abc/i".to_string(),
            ..good_rule()
        });
        assert!(report.is_valid);
    }

    #[test]
    fn threshold_completeness() {
        let report = validate_rule(&RuleRecord {
            threshold_type: Some(ThresholdType::Limit),
            ..good_rule()
        });
        assert_eq!(report.errors.len(), 3);

        let report = validate_rule(&RuleRecord {
            threshold_type: Some(ThresholdType::Limit),
            threshold_track: Some(ThresholdTrack::BySrc),
            threshold_count: 1,
            threshold_seconds: 60,
            ..good_rule()
        });
        assert!(report.is_valid);
    }

    #[test]
    fn depth_and_offset_need_content() {
        let report = validate_rule(&RuleRecord {
            content: String::new(),
            pcre: "/x/".to_string(),
            depth: 10,
            offset: 20,
            ..good_rule()
        });
        assert!(report.errors.contains(&"Depth requires content.".to_string()));
        assert!(report.errors.contains(&"Offset requires content.".to_string()));
        assert!(report.warnings.iter().any(|w| w.starts_with("Offset >= depth")));
    }

    #[test]
    fn non_standard_classtype_warns() {
        let report = validate_rule(&RuleRecord {
            classtype: "made-up".to_string(),
            ..good_rule()
        });
        assert!(report.is_valid);
        assert_eq!(report.warnings, vec!["Classtype 'made-up' is non-standard."]);
    }
}

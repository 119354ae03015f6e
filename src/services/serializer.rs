//! Canonical rule text rendering.
//!
//! Output format:
//! `<action> <protocol> <src_ip> <src_port> <direction> <dst_ip> <dst_port> (<options>;)`
//!
//! Options always appear in the same order (msg, flow, content, depth, offset,
//! distance, within, pcre, classtype, priority, reference, metadata, threshold,
//! sid, rev) so downstream tooling can rely on positions. Values are passed
//! through verbatim; no quoting or escaping is applied.

use chrono::NaiveDateTime;

use crate::models::rule::RuleRecord;

/// Width of the `═` rule in the rules-file banner.
const BANNER_WIDTH: usize = 55;

/// Encode a record as one line of canonical rule text.
pub fn encode(rule: &RuleRecord) -> String {
    format!("{} ({})", header(rule), options(rule))
}

fn header(rule: &RuleRecord) -> String {
    format!(
        "{} {} {} {} {} {} {}",
        rule.action,
        rule.protocol,
        rule.src_ip,
        rule.src_port,
        rule.direction,
        rule.dst_ip,
        rule.dst_port
    )
}

fn options(rule: &RuleRecord) -> String {
    let mut opts: Vec<String> = Vec::new();

    if !rule.msg.is_empty() {
        opts.push(format!("msg:\"{}\"", rule.msg));
    }

    let flow = rule.flow_set();
    if !flow.is_empty() {
        opts.push(format!("flow:{flow}"));
    }

    if !rule.content.is_empty() {
        let prefix = if rule.content_negated { "!" } else { "" };
        let mut content = format!("content:\"{prefix}{}\"", rule.content);
        if rule.content_nocase {
            content.push_str("; nocase");
        }
        opts.push(content);
    }

    for (key, value) in [
        ("depth", rule.depth),
        ("offset", rule.offset),
        ("distance", rule.distance),
        ("within", rule.within),
    ] {
        if value > 0 {
            opts.push(format!("{key}:{value}"));
        }
    }

    if !rule.pcre.is_empty() {
        opts.push(format!("pcre:\"{}\"", rule.pcre));
    }
    if !rule.classtype.is_empty() {
        opts.push(format!("classtype:{}", rule.classtype));
    }
    if rule.priority > 0 {
        opts.push(format!("priority:{}", rule.priority));
    }
    if !rule.reference.is_empty() {
        opts.push(format!("reference:{}", rule.reference));
    }
    if !rule.metadata.is_empty() {
        opts.push(format!("metadata:{}", rule.metadata));
    }

    if let (true, Some(kind)) = (rule.has_threshold(), rule.threshold_type) {
        let track = rule.threshold_track.map(|t| t.as_str()).unwrap_or("");
        opts.push(format!(
            "threshold:type {kind}, track {track}, count {}, seconds {}",
            rule.threshold_count, rule.threshold_seconds
        ));
    }

    opts.push(format!("sid:{}", rule.sid));
    opts.push(format!("rev:{}", rule.rev));

    opts.join("; ") + ";"
}

/// Encode records one per line, in collection order.
pub fn encode_all(rules: &[RuleRecord]) -> String {
    rules.iter().map(encode).collect::<Vec<_>>().join("\n")
}

/// Render a complete `.rules` document: comment banner followed by one rule per line.
pub fn render_rules_file(rules: &[RuleRecord], generated_at: NaiveDateTime) -> String {
    let bar = "═".repeat(BANNER_WIDTH);
    let mut lines = vec![
        format!("# {bar}"),
        "# SnortForge — Generated Rules".to_string(),
        format!("# Date: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!("# Total Rules: {}", rules.len()),
        format!("# {bar}"),
        String::new(),
    ];
    lines.extend(rules.iter().map(encode));
    lines.join("\n") + "\n"
}

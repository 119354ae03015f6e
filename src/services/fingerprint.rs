//! Detection fingerprint for spotting rules that match the same traffic.
//!
//! Hashes the fields that decide what a rule matches: header addressing,
//! flow, content modifiers, pcre and threshold. Excludes action and the
//! bookkeeping fields (msg, sid, rev, classtype, priority, reference, metadata)
//! so a renumbered or reworded copy still collides with its source.

use sha2::{Digest, Sha256};

use crate::models::rule::RuleRecord;

/// Compute the detection fingerprint of a rule.
pub fn compute(rule: &RuleRecord) -> String {
    let threshold = if rule.has_threshold() {
        format!(
            "{}/{}/{}/{}",
            rule.threshold_type.map(|t| t.as_str()).unwrap_or(""),
            rule.threshold_track.map(|t| t.as_str()).unwrap_or(""),
            rule.threshold_count,
            rule.threshold_seconds
        )
    } else {
        String::new()
    };

    hash(&format!(
        "RULE:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}",
        rule.protocol,
        rule.src_ip,
        rule.src_port,
        rule.direction,
        rule.dst_ip,
        rule.dst_port,
        rule.flow_set(),
        rule.content,
        rule.content_nocase,
        rule.content_negated,
        rule.depth,
        rule.offset,
        rule.distance,
        rule.within,
        rule.pcre,
        threshold
    ))
}

/// SHA-256 hash a string and return hex-encoded digest.
fn hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

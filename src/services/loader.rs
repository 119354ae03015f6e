//! Reverse loader: turns a stored rule back into builder form state.

use crate::models::form::FormState;
use crate::models::rule::RuleRecord;

/// Rebuild the builder form from a record.
///
/// The stored flow string is split into the six toggles; tokens the builder
/// has no toggle for are dropped.
pub fn decode(rule: &RuleRecord) -> FormState {
    let mut form = FormState {
        action: rule.action,
        protocol: rule.protocol,
        src_ip: rule.src_ip.clone(),
        src_port: rule.src_port.clone(),
        direction: rule.direction,
        dst_ip: rule.dst_ip.clone(),
        dst_port: rule.dst_port.clone(),
        msg: rule.msg.clone(),
        sid: rule.sid,
        rev: rule.rev,
        priority: rule.priority,
        classtype: rule.classtype.clone(),
        reference: rule.reference.clone(),
        content: rule.content.clone(),
        content_nocase: rule.content_nocase,
        content_negated: rule.content_negated,
        depth: rule.depth,
        offset: rule.offset,
        distance: rule.distance,
        within: rule.within,
        pcre: rule.pcre.clone(),
        threshold_type: rule.threshold_type,
        threshold_track: rule.threshold_track,
        threshold_count: rule.threshold_count,
        threshold_seconds: rule.threshold_seconds,
        metadata: rule.metadata.clone(),
        ..FormState::default()
    };
    form.set_flow(rule.flow_set());
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::{Direction, FlowSet, Protocol, ThresholdTrack, ThresholdType};
    use crate::parsers::{project::ProjectParser, rule_text::RuleTextParser, Parser};
    use crate::services::{serializer, templates};

    /// decode then rebuild must give back every field, flow compared as a set.
    fn assert_round_trip(original: &RuleRecord) {
        let rebuilt = decode(original).to_record();
        assert_eq!(rebuilt.flow_set(), original.flow_set(), "flow of sid {}", original.sid);
        assert_eq!(
            RuleRecord {
                flow: String::new(),
                ..rebuilt
            },
            RuleRecord {
                flow: String::new(),
                ..original.clone()
            }
        );
    }

    fn full_rule() -> RuleRecord {
        RuleRecord {
            protocol: Protocol::Udp,
            src_ip: "$HOME_NET".to_string(),
            src_port: "1024:".to_string(),
            direction: Direction::Bidirectional,
            dst_ip: "10.0.0.0/8".to_string(),
            dst_port: "53".to_string(),
            msg: "Long DNS query".to_string(),
            sid: 1_000_012,
            rev: 2,
            classtype: "trojan-activity".to_string(),
            priority: 2,
            reference: "url,example.com/dns".to_string(),
            content: "|00 01|".to_string(),
            content_nocase: true,
            content_negated: true,
            pcre: "/[a-z0-9]{50,}/i".to_string(),
            depth: 40,
            offset: 2,
            distance: 1,
            within: 30,
            flow: "to_server,stateless".to_string(),
            threshold_type: Some(ThresholdType::Both),
            threshold_track: Some(ThresholdTrack::ByDst),
            threshold_count: 5,
            threshold_seconds: 60,
            metadata: "policy security-ips".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn round_trip_reproduces_every_field() {
        let original = full_rule();
        let rebuilt = decode(&original).accept().unwrap();
        assert_eq!(rebuilt.flow_set(), original.flow_set());
        assert_eq!(
            RuleRecord {
                flow: String::new(),
                ..rebuilt.clone()
            },
            RuleRecord {
                flow: String::new(),
                ..original.clone()
            }
        );
        assert_eq!(serializer::encode(&rebuilt), serializer::encode(&original));
    }

    #[test]
    fn round_trip_keeps_whitespace_and_blank_addresses() {
        let rule: RuleRecord = serde_json::from_str(
            r#"{"msg":" Test ","content":" HTTP/1.1","pcre":"/a b/ ","src_ip":"","dst_port":"","metadata":"policy x ","sid":1000002}"#,
        )
        .unwrap();
        let rebuilt = decode(&rule).to_record();
        assert_eq!(rebuilt.content, " HTTP/1.1");
        assert_eq!(rebuilt.src_ip, "");
        assert_eq!(rebuilt, rule);
    }

    #[test]
    fn round_trip_every_project_record() {
        let result = ProjectParser::new()
            .parse(include_bytes!("../../tests/fixtures/project_sample.json"))
            .unwrap();
        assert!(!result.rules.is_empty());
        for rule in &result.rules {
            assert_round_trip(rule);
        }
    }

    #[test]
    fn round_trip_every_rules_file_record() {
        let result = RuleTextParser::new()
            .parse(include_bytes!("../../tests/fixtures/sample.rules"))
            .unwrap();
        assert!(!result.rules.is_empty());
        for rule in &result.rules {
            assert_round_trip(rule);
        }
    }

    #[test]
    fn round_trip_every_template() {
        let catalog = templates::list(None);
        assert_eq!(catalog.len(), 12);
        for summary in &catalog {
            assert_round_trip(&summary.rule_data);
            let rebuilt = decode(&summary.rule_data).to_record();
            assert_eq!(serializer::encode(&rebuilt), summary.rule_text, "{}", summary.name);
        }
    }

    #[test]
    fn flow_tokens_map_to_toggles() {
        let form = decode(&RuleRecord {
            flow: "established, to_client ,from_server".to_string(),
            ..Default::default()
        });
        assert!(form.flow_established);
        assert!(form.flow_to_client);
        assert!(form.flow_from_server);
        assert!(!form.flow_to_server);
        assert!(!form.flow_stateless);
        assert!(!form.flow_from_client);
    }

    #[test]
    fn unknown_flow_tokens_dropped() {
        let form = decode(&RuleRecord {
            flow: "not_established,only_stream".to_string(),
            ..Default::default()
        });
        assert_eq!(form.flow_set(), FlowSet::default());
    }

    #[test]
    fn partial_template_defaults() {
        let rule: RuleRecord =
            serde_json::from_str(r#"{"msg":"Ping sweep","protocol":"icmp"}"#).unwrap();
        let form = decode(&rule);
        assert_eq!(form.depth, 0);
        assert_eq!(form.rev, 1);
        assert_eq!(form.threshold_type, None);
        assert_eq!(form.pcre, "");
    }
}

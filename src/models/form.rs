//! Builder form state: the editable view of a rule record.
//!
//! Differs from [`RuleRecord`] in one place: `flow` is held as six independent
//! toggles instead of a comma-joined string.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::rule::{
    empty_as_none, Action, Direction, FlowOption, FlowSet, Protocol, RuleRecord, ThresholdTrack,
    ThresholdType, DEFAULT_SID,
};
use crate::services::collection::CollectionError;

/// Operator-facing message for the acceptance gate.
pub const MSG_REQUIRED: &str = "Message is required to add a rule";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct FormState {
    pub action: Action,
    pub protocol: Protocol,
    pub src_ip: String,
    pub src_port: String,
    pub direction: Direction,
    pub dst_ip: String,
    pub dst_port: String,

    #[validate(custom(function = "not_blank", message = "Message is required to add a rule"))]
    pub msg: String,
    pub sid: u32,
    pub rev: u32,
    pub priority: u32,
    pub classtype: String,
    pub reference: String,

    pub content: String,
    pub content_nocase: bool,
    pub content_negated: bool,
    pub depth: u32,
    pub offset: u32,
    pub distance: u32,
    pub within: u32,
    pub pcre: String,

    pub flow_established: bool,
    pub flow_stateless: bool,
    pub flow_to_server: bool,
    pub flow_to_client: bool,
    pub flow_from_server: bool,
    pub flow_from_client: bool,

    #[serde(with = "empty_as_none")]
    pub threshold_type: Option<ThresholdType>,
    #[serde(with = "empty_as_none")]
    pub threshold_track: Option<ThresholdTrack>,
    pub threshold_count: u32,
    pub threshold_seconds: u32,

    pub metadata: String,
}

impl Default for FormState {
    /// A cleared builder form.
    fn default() -> Self {
        Self {
            action: Action::Alert,
            protocol: Protocol::Tcp,
            src_ip: "any".to_string(),
            src_port: "any".to_string(),
            direction: Direction::Unidirectional,
            dst_ip: "any".to_string(),
            dst_port: "any".to_string(),
            msg: String::new(),
            sid: DEFAULT_SID,
            rev: 1,
            priority: 0,
            classtype: String::new(),
            reference: String::new(),
            content: String::new(),
            content_nocase: false,
            content_negated: false,
            depth: 0,
            offset: 0,
            distance: 0,
            within: 0,
            pcre: String::new(),
            flow_established: false,
            flow_stateless: false,
            flow_to_server: false,
            flow_to_client: false,
            flow_from_server: false,
            flow_from_client: false,
            threshold_type: None,
            threshold_track: Some(ThresholdTrack::BySrc),
            threshold_count: 0,
            threshold_seconds: 0,
            metadata: String::new(),
        }
    }
}

impl FormState {
    /// Flow toggles as a set.
    pub fn flow_set(&self) -> FlowSet {
        let mut set = FlowSet::default();
        set.set(FlowOption::Established, self.flow_established);
        set.set(FlowOption::Stateless, self.flow_stateless);
        set.set(FlowOption::ToServer, self.flow_to_server);
        set.set(FlowOption::ToClient, self.flow_to_client);
        set.set(FlowOption::FromServer, self.flow_from_server);
        set.set(FlowOption::FromClient, self.flow_from_client);
        set
    }

    /// Apply a flow set to the six toggles.
    pub fn set_flow(&mut self, flow: FlowSet) {
        self.flow_established = flow.contains(FlowOption::Established);
        self.flow_stateless = flow.contains(FlowOption::Stateless);
        self.flow_to_server = flow.contains(FlowOption::ToServer);
        self.flow_to_client = flow.contains(FlowOption::ToClient);
        self.flow_from_server = flow.contains(FlowOption::FromServer);
        self.flow_from_client = flow.contains(FlowOption::FromClient);
    }

    /// Build a record field-for-field, without the acceptance gate.
    ///
    /// Nothing is trimmed or defaulted, so a record loaded from an import or
    /// template comes back unchanged apart from flow token order.
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            action: self.action,
            protocol: self.protocol,
            src_ip: self.src_ip.clone(),
            src_port: self.src_port.clone(),
            direction: self.direction,
            dst_ip: self.dst_ip.clone(),
            dst_port: self.dst_port.clone(),
            msg: self.msg.clone(),
            sid: self.sid,
            rev: self.rev,
            classtype: self.classtype.clone(),
            priority: self.priority,
            reference: self.reference.clone(),
            content: self.content.clone(),
            content_nocase: self.content_nocase,
            content_negated: self.content_negated,
            pcre: self.pcre.clone(),
            depth: self.depth,
            offset: self.offset,
            distance: self.distance,
            within: self.within,
            flow: self.flow_set().to_string(),
            threshold_type: self.threshold_type,
            threshold_track: self.threshold_track,
            threshold_count: self.threshold_count,
            threshold_seconds: self.threshold_seconds,
            metadata: self.metadata.clone(),
        }
    }

    /// Build a record for manual addition to the collection.
    ///
    /// Fails with an input error when `msg` is empty after trimming. Text
    /// fields typed by the operator are trimmed and blank addresses or ports
    /// become `any`. `content` and `pcre` are kept byte-for-byte since
    /// whitespace in them changes what the rule matches.
    pub fn accept(&self) -> Result<RuleRecord, CollectionError> {
        if let Err(errors) = self.validate() {
            tracing::debug!(%errors, "Form rejected by acceptance gate");
            return Err(CollectionError::Input(MSG_REQUIRED.to_string()));
        }
        let record = self.to_record();
        Ok(RuleRecord {
            src_ip: or_any(&record.src_ip),
            src_port: or_any(&record.src_port),
            dst_ip: or_any(&record.dst_ip),
            dst_port: or_any(&record.dst_port),
            msg: record.msg.trim().to_string(),
            classtype: record.classtype.trim().to_string(),
            reference: record.reference.trim().to_string(),
            metadata: record.metadata.trim().to_string(),
            ..record
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn or_any(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "any".to_string()
    } else {
        trimmed.to_string()
    }
}

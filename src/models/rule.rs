//! Core rule record model with the header and option enums it is built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Signature id assigned to a blank record.
pub const DEFAULT_SID: u32 = 1_000_001;

/// Error returned when a keyword does not name a known variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownKeyword {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownKeyword {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// -- Header enums --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Alert,
    Log,
    Pass,
    Drop,
    Reject,
    Sdrop,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Self::Alert,
        Self::Log,
        Self::Pass,
        Self::Drop,
        Self::Reject,
        Self::Sdrop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Log => "log",
            Self::Pass => "pass",
            Self::Drop => "drop",
            Self::Reject => "reject",
            Self::Sdrop => "sdrop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownKeyword::new("action", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Icmp,
    Ip,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [Self::Tcp, Self::Udp, Self::Icmp, Self::Ip];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
            Self::Ip => "ip",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownKeyword::new("protocol", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    #[serde(rename = "->")]
    Unidirectional,
    #[serde(rename = "<>")]
    Bidirectional,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unidirectional => "->",
            Self::Bidirectional => "<>",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "->" => Ok(Self::Unidirectional),
            "<>" => Ok(Self::Bidirectional),
            other => Err(UnknownKeyword::new("direction", other)),
        }
    }
}

// -- Threshold enums --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    Limit,
    Threshold,
    Both,
}

impl ThresholdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Threshold => "threshold",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdType {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "limit" => Ok(Self::Limit),
            "threshold" => Ok(Self::Threshold),
            "both" => Ok(Self::Both),
            other => Err(UnknownKeyword::new("threshold type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdTrack {
    #[default]
    BySrc,
    ByDst,
}

impl ThresholdTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BySrc => "by_src",
            Self::ByDst => "by_dst",
        }
    }
}

impl fmt::Display for ThresholdTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdTrack {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_src" => Ok(Self::BySrc),
            "by_dst" => Ok(Self::ByDst),
            other => Err(UnknownKeyword::new("threshold track", other)),
        }
    }
}

// -- Flow --

/// One `flow` keyword the builder knows how to toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOption {
    Established,
    Stateless,
    ToServer,
    ToClient,
    FromServer,
    FromClient,
}

impl FlowOption {
    /// Canonical emission order.
    pub const ALL: [FlowOption; 6] = [
        Self::Established,
        Self::Stateless,
        Self::ToServer,
        Self::ToClient,
        Self::FromServer,
        Self::FromClient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Established => "established",
            Self::Stateless => "stateless",
            Self::ToServer => "to_server",
            Self::ToClient => "to_client",
            Self::FromServer => "from_server",
            Self::FromClient => "from_client",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl FromStr for FlowOption {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| UnknownKeyword::new("flow option", s))
    }
}

/// Set of flow options. Renders in canonical order regardless of insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowSet(u8);

impl FlowSet {
    /// Parse a stored comma-joined flow string. Unrecognized tokens are dropped.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .filter_map(|token| token.trim().parse::<FlowOption>().ok())
            .collect()
    }

    pub fn contains(&self, option: FlowOption) -> bool {
        self.0 & option.bit() != 0
    }

    pub fn insert(&mut self, option: FlowOption) {
        self.0 |= option.bit();
    }

    pub fn set(&mut self, option: FlowOption, enabled: bool) {
        if enabled {
            self.insert(option);
        } else {
            self.0 &= !option.bit();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FlowOption> + '_ {
        FlowOption::ALL.into_iter().filter(|o| self.contains(*o))
    }
}

impl FromIterator<FlowOption> for FlowSet {
    fn from_iter<I: IntoIterator<Item = FlowOption>>(iter: I) -> Self {
        let mut set = Self::default();
        for option in iter {
            set.insert(option);
        }
        set
    }
}

impl fmt::Display for FlowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.iter().map(|o| o.as_str()).collect();
        f.write_str(&parts.join(","))
    }
}

// -- Rule Record --

/// Structured representation of one signature.
///
/// Field names match the persisted project format. Numeric options use 0 and
/// string options use `""` to mean "absent"; the serializer never emits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleRecord {
    pub action: Action,
    pub protocol: Protocol,
    pub src_ip: String,
    pub src_port: String,
    pub direction: Direction,
    pub dst_ip: String,
    pub dst_port: String,

    pub msg: String,
    pub sid: u32,
    pub rev: u32,
    pub classtype: String,
    pub priority: u32,
    pub reference: String,

    pub content: String,
    pub content_nocase: bool,
    pub content_negated: bool,
    pub pcre: String,
    pub depth: u32,
    pub offset: u32,
    pub distance: u32,
    pub within: u32,

    pub flow: String,

    #[serde(with = "empty_as_none")]
    pub threshold_type: Option<ThresholdType>,
    #[serde(with = "empty_as_none")]
    pub threshold_track: Option<ThresholdTrack>,
    pub threshold_count: u32,
    pub threshold_seconds: u32,

    pub metadata: String,
}

impl Default for RuleRecord {
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
            classtype: String::new(),
            priority: 0,
            reference: String::new(),
            content: String::new(),
            content_nocase: false,
            content_negated: false,
            pcre: String::new(),
            depth: 0,
            offset: 0,
            distance: 0,
            within: 0,
            flow: String::new(),
            threshold_type: None,
            threshold_track: None,
            threshold_count: 0,
            threshold_seconds: 0,
            metadata: String::new(),
        }
    }
}

impl RuleRecord {
    /// Flow options of the stored flow string.
    pub fn flow_set(&self) -> FlowSet {
        FlowSet::parse(&self.flow)
    }

    /// Whether all threshold fields are present, so a threshold clause is emitted.
    pub fn has_threshold(&self) -> bool {
        self.threshold_type.is_some() && self.threshold_count > 0 && self.threshold_seconds > 0
    }
}

impl fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::services::serializer::encode(self))
    }
}

/// Optional keyword fields persisted as `""` when unset.
pub(crate) mod empty_as_none {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

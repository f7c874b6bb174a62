//! Supporting types for the ManagedMachinePool CRD

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Role of a node pool inside the managed cluster
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum PoolMode {
    /// Hosts cluster-critical system workloads
    System,
    /// Hosts user workloads only
    #[default]
    User,
}

impl std::fmt::Display for PoolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "System"),
            Self::User => write!(f, "User"),
        }
    }
}

/// Kind of OS disk attached to each node
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum OsDiskType {
    /// Remote managed disk
    Managed,
    /// Node-local ephemeral disk
    Ephemeral,
}

impl std::fmt::Display for OsDiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Managed => write!(f, "Managed"),
            Self::Ephemeral => write!(f, "Ephemeral"),
        }
    }
}

/// Eviction priority of the scale set backing the pool
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ScaleSetPriority {
    /// Regular on-demand capacity
    Regular,
    /// Spot capacity that may be evicted
    Spot,
}

impl std::fmt::Display for ScaleSetPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "Regular"),
            Self::Spot => write!(f, "Spot"),
        }
    }
}

/// Autoscaler bounds for the pool
///
/// Both bounds travel together: either the whole block is absent, or both
/// counts are set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoScaling {
    /// Lower bound on node count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<i32>,

    /// Upper bound on node count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<i32>,
}

/// Kubelet tuning applied to every node in the pool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConfig {
    /// Unsafe sysctls (or sysctl patterns) pods on these nodes may set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_unsafe_sysctls: Option<Vec<String>>,
}

/// Effect a taint has on pods that do not tolerate it
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum TaintEffect {
    /// New pods are not scheduled onto the node
    NoSchedule,
    /// The scheduler avoids the node when it can
    PreferNoSchedule,
    /// Running pods are evicted as well
    NoExecute,
}

impl TaintEffect {
    /// All accepted effects, in their wire spelling
    pub const ALL: [TaintEffect; 3] = [Self::NoSchedule, Self::PreferNoSchedule, Self::NoExecute];

    fn as_str(&self) -> &'static str {
        match self {
            Self::NoSchedule => "NoSchedule",
            Self::PreferNoSchedule => "PreferNoSchedule",
            Self::NoExecute => "NoExecute",
        }
    }
}

impl std::fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaintEffect {
    type Err = TaintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|effect| effect.as_str() == s)
            .ok_or_else(|| TaintParseError::InvalidEffect(s.to_string()))
    }
}

/// Reason a taint string failed to parse
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaintParseError {
    /// No `:` separating the effect
    #[error("missing ':<effect>' suffix")]
    MissingEffect,

    /// No `=` separating key and value
    #[error("missing '=' between key and value")]
    MissingValue,

    /// Effect is not one of the supported spellings
    #[error("effect {0:?} must be one of NoSchedule, PreferNoSchedule, NoExecute")]
    InvalidEffect(String),

    /// Key is not a qualified name
    #[error("key {key:?} is invalid: {reason}")]
    InvalidKey {
        /// The offending key
        key: String,
        /// What is wrong with it
        reason: String,
    },

    /// Value is not a valid label value
    #[error("value {value:?} is invalid: {reason}")]
    InvalidValue {
        /// The offending value
        value: String,
        /// What is wrong with it
        reason: String,
    },
}

/// A parsed `key=value:effect` node taint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeTaint {
    /// Taint key, optionally prefixed with a DNS subdomain
    pub key: String,
    /// Taint value
    pub value: String,
    /// Taint effect
    pub effect: TaintEffect,
}

impl std::str::FromStr for NodeTaint {
    type Err = TaintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pair, effect) = s.rsplit_once(':').ok_or(TaintParseError::MissingEffect)?;
        let effect: TaintEffect = effect.parse()?;
        let (key, value) = pair.split_once('=').ok_or(TaintParseError::MissingValue)?;

        validate_qualified_name(key).map_err(|reason| TaintParseError::InvalidKey {
            key: key.to_string(),
            reason,
        })?;
        validate_name_segment(value).map_err(|reason| TaintParseError::InvalidValue {
            value: value.to_string(),
            reason,
        })?;

        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
            effect,
        })
    }
}

impl std::fmt::Display for NodeTaint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}:{}", self.key, self.value, self.effect)
    }
}

const MAX_SEGMENT_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

/// Validate a Kubernetes qualified name: `[prefix/]name`
fn validate_qualified_name(s: &str) -> Result<(), String> {
    match s.split_once('/') {
        Some((prefix, name)) => {
            validate_dns_subdomain(prefix)?;
            validate_name_segment(name)
        }
        None => validate_name_segment(s),
    }
}

/// Validate a single name segment (also the label value grammar).
///
/// Rules:
/// - 1 to 63 characters
/// - Starts and ends with an ASCII alphanumeric
/// - May contain `-`, `_` and `.` in between
fn validate_name_segment(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must not be empty".to_string());
    }
    if s.len() > MAX_SEGMENT_LEN {
        return Err(format!("must be at most {MAX_SEGMENT_LEN} characters"));
    }

    let bytes = s.as_bytes();
    let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err("must start and end with an alphanumeric character".to_string());
    }

    if let Some(c) = s
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
    {
        return Err(format!("contains invalid character {c:?}"));
    }

    Ok(())
}

/// Validate a lowercase DNS subdomain used as a key prefix
fn validate_dns_subdomain(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("prefix must not be empty".to_string());
    }
    if s.len() > MAX_PREFIX_LEN {
        return Err(format!("prefix must be at most {MAX_PREFIX_LEN} characters"));
    }

    for label in s.split('.') {
        let valid = !label.is_empty()
            && label.len() <= MAX_SEGMENT_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(format!("prefix {s:?} must be a lowercase DNS subdomain"));
        }
    }

    Ok(())
}

//! Defaulting and validation engine for ManagedMachinePool
//!
//! The engine is three pure operations plus one boundary type:
//!
//! - [`apply_defaults`] fills in the mode label and pool name
//! - [`validate_create`] runs every field-level rule on a spec
//! - [`validate_update`] re-runs the field rules and diffs the fixed fields
//! - [`PoolAdmission`] wraps them for the admission dispatcher, turning
//!   violation lists into [`Error::Rejected`]
//!
//! None of them perform I/O, so concurrent requests never interfere.
//!
//! Every rule reports all of its violations; nothing stops at the first one.

mod defaults;
mod immutable;
pub mod rules;

use kube::ResourceExt;
use tracing::{debug, info};

pub use defaults::apply_defaults;
pub use immutable::{validate_immutable_fields, Change, ImmutableField, IMMUTABLE_FIELDS};

use crate::crd::{ManagedMachinePool, ManagedMachinePoolSpec};
use crate::Error;

/// Category of a violation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Malformed value (taint grammar, sysctl allowlist)
    Syntax,
    /// Fields that must be set together are not
    Pairing,
    /// A fixed field changed between versions
    Immutable,
}

/// A single reason a spec, or a spec transition, is invalid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Category of the violation
    pub kind: ViolationKind,
    /// Dotted field path rooted at `spec`
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl Violation {
    /// Create a violation on the given field
    pub fn new(kind: ViolationKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a freshly defaulted spec
pub fn validate_create(spec: &ManagedMachinePoolSpec) -> Vec<Violation> {
    let mut violations = rules::validate_node_taints(&spec.node_taints);
    violations.extend(rules::validate_allowed_unsafe_sysctls(
        spec.allowed_unsafe_sysctls(),
    ));
    violations.extend(rules::validate_auto_scaling(spec.auto_scaling.as_ref()));
    violations
}

/// Validate a transition from `old` to `new`
pub fn validate_update(
    new: &ManagedMachinePoolSpec,
    old: &ManagedMachinePoolSpec,
) -> Vec<Violation> {
    let mut violations = validate_create(new);
    violations.extend(validate_immutable_fields(new, old));
    violations
}

/// Admission entry points used by the webhook
#[derive(Clone, Copy, Debug, Default)]
pub struct PoolAdmission;

impl PoolAdmission {
    /// Create the admission engine
    pub fn new() -> Self {
        Self
    }

    /// Default a pool in place. `identity` is the resource's own name.
    pub fn default(&self, pool: &mut ManagedMachinePool, identity: &str) {
        apply_defaults(pool, identity);
        debug!(
            pool = %identity,
            mode = %pool.spec.mode,
            name = ?pool.spec.name,
            "Applied pool defaults"
        );
    }

    /// Validate a pool being created
    pub fn validate_create(&self, pool: &ManagedMachinePool) -> crate::Result<()> {
        reject_or_accept(pool, validate_create(&pool.spec))
    }

    /// Validate an update from `old` to `new`
    pub fn validate_update(
        &self,
        new: &ManagedMachinePool,
        old: &ManagedMachinePool,
    ) -> crate::Result<()> {
        reject_or_accept(new, validate_update(&new.spec, &old.spec))
    }
}

fn reject_or_accept(pool: &ManagedMachinePool, violations: Vec<Violation>) -> crate::Result<()> {
    if !violations.is_empty() {
        info!(
            pool = %pool.name_any(),
            violations = violations.len(),
            "Rejecting ManagedMachinePool"
        );
    }
    Error::reject_if_any(pool.name_any(), violations)
}

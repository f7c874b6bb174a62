//! Field-level validity rules
//!
//! Each rule inspects one field of the spec and returns every violation it
//! finds. Rules never short-circuit, and never look at the previous version
//! of the object.

use crate::crd::{AutoScaling, NodeTaint};

use super::{Violation, ViolationKind};

/// Sysctl patterns pods on a pool may be allowed to set.
///
/// A trailing `*` matches any suffix; entries without one must match exactly.
pub const ALLOWED_UNSAFE_SYSCTLS: [&str; 5] =
    ["kernel.shm*", "kernel.msg*", "kernel.sem", "fs.mqueue.*", "net.*"];

/// Check that every taint follows `key=value:effect`
pub fn validate_node_taints(taints: &[String]) -> Vec<Violation> {
    taints
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            raw.parse::<NodeTaint>().err().map(|e| {
                Violation::new(
                    ViolationKind::Syntax,
                    format!("spec.nodeTaints[{i}]"),
                    format!("taint {raw:?} must be of the form key=value:effect: {e}"),
                )
            })
        })
        .collect()
}

/// Check that every unsafe sysctl is covered by the allowlist
pub fn validate_allowed_unsafe_sysctls(sysctls: &[String]) -> Vec<Violation> {
    sysctls
        .iter()
        .enumerate()
        .filter(|(_, sysctl)| !is_allowed_sysctl(sysctl))
        .map(|(i, sysctl)| {
            Violation::new(
                ViolationKind::Syntax,
                format!("spec.kubeletConfig.allowedUnsafeSysctls[{i}]"),
                format!(
                    "{sysctl:?} is not allowed, must be one of {}",
                    ALLOWED_UNSAFE_SYSCTLS.join(", ")
                ),
            )
        })
        .collect()
}

fn is_allowed_sysctl(sysctl: &str) -> bool {
    ALLOWED_UNSAFE_SYSCTLS.iter().any(|pattern| {
        sysctl == *pattern
            || pattern
                .strip_suffix('*')
                .is_some_and(|prefix| sysctl.starts_with(prefix))
    })
}

/// Check that autoscaling bounds are set together.
///
/// Only pairing is enforced; min/max ordering is left to the cloud provider.
pub fn validate_auto_scaling(auto_scaling: Option<&AutoScaling>) -> Vec<Violation> {
    let Some(bounds) = auto_scaling else {
        return Vec::new();
    };

    let missing: Vec<&str> = [
        ("minCount", bounds.min_count.is_none()),
        ("maxCount", bounds.max_count.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    if missing.is_empty() {
        return Vec::new();
    }

    vec![Violation::new(
        ViolationKind::Pairing,
        "spec.autoScaling",
        format!(
            "minCount and maxCount must both be set when autoScaling is enabled, missing {}",
            missing.join(" and ")
        ),
    )]
}

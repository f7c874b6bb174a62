//! Immutable-field diff between two versions of a pool spec
//!
//! The set of fixed fields is an explicit table so the rule set can be read
//! in one place. Optional fields compare by presence as well as value:
//! going from absent to `false` is a change.

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::crd::ManagedMachinePoolSpec;

use super::{Violation, ViolationKind};

/// Rendered old and new values of a field that changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// Value before the update
    pub old: String,
    /// Value after the update
    pub new: String,
}

type Diff = fn(&ManagedMachinePoolSpec, &ManagedMachinePoolSpec) -> Option<Change>;

/// One row of the immutability table
pub struct ImmutableField {
    /// Field path reported in violations
    pub path: &'static str,
    diff: Diff,
}

impl ImmutableField {
    /// Compare the field between `new` and `old`
    pub fn diff(&self, new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
        (self.diff)(new, old)
    }
}

/// Fields fixed for the lifetime of a pool
pub const IMMUTABLE_FIELDS: &[ImmutableField] = &[
    ImmutableField {
        path: "spec.sku",
        diff: sku,
    },
    ImmutableField {
        path: "spec.osDiskSizeGB",
        diff: os_disk_size_gb,
    },
    ImmutableField {
        path: "spec.osDiskType",
        diff: os_disk_type,
    },
    ImmutableField {
        path: "spec.enableFIPS",
        diff: enable_fips,
    },
    ImmutableField {
        path: "spec.enableNodePublicIP",
        diff: enable_node_public_ip,
    },
    ImmutableField {
        path: "spec.scaleSetPriority",
        diff: scale_set_priority,
    },
    ImmutableField {
        path: "spec.maxPods",
        diff: max_pods,
    },
    ImmutableField {
        path: "spec.nodeTaints",
        diff: node_taints,
    },
];

/// Report one violation per immutable field that differs
pub fn validate_immutable_fields(
    new: &ManagedMachinePoolSpec,
    old: &ManagedMachinePoolSpec,
) -> Vec<Violation> {
    IMMUTABLE_FIELDS
        .iter()
        .filter_map(|field| {
            field.diff(new, old).map(|change| {
                Violation::new(
                    ViolationKind::Immutable,
                    field.path,
                    format!(
                        "field is immutable (was {}, now {})",
                        change.old, change.new
                    ),
                )
            })
        })
        .collect()
}

fn compare<T: PartialEq + Display>(old: &Option<T>, new: &Option<T>) -> Option<Change> {
    (old != new).then(|| Change {
        old: render(old),
        new: render(new),
    })
}

fn render<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "<unset>".to_string(),
    }
}

fn sku(new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
    (old.sku != new.sku).then(|| Change {
        old: format!("{:?}", old.sku),
        new: format!("{:?}", new.sku),
    })
}

fn os_disk_size_gb(new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
    compare(&old.os_disk_size_gb, &new.os_disk_size_gb)
}

fn os_disk_type(new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
    compare(&old.os_disk_type, &new.os_disk_type)
}

fn enable_fips(new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
    compare(&old.enable_fips, &new.enable_fips)
}

fn enable_node_public_ip(
    new: &ManagedMachinePoolSpec,
    old: &ManagedMachinePoolSpec,
) -> Option<Change> {
    compare(&old.enable_node_public_ip, &new.enable_node_public_ip)
}

fn scale_set_priority(
    new: &ManagedMachinePoolSpec,
    old: &ManagedMachinePoolSpec,
) -> Option<Change> {
    compare(&old.scale_set_priority, &new.scale_set_priority)
}

fn max_pods(new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
    compare(&old.max_pods, &new.max_pods)
}

/// Taints compare as a set; order and duplicates do not matter
fn node_taints(new: &ManagedMachinePoolSpec, old: &ManagedMachinePoolSpec) -> Option<Change> {
    let old_set: BTreeSet<&str> = old.node_taints.iter().map(String::as_str).collect();
    let new_set: BTreeSet<&str> = new.node_taints.iter().map(String::as_str).collect();

    (old_set != new_set).then(|| Change {
        old: format!("{old_set:?}"),
        new: format!("{new_set:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{OsDiskType, ScaleSetPriority};
    use rstest::rstest;

    fn base() -> ManagedMachinePoolSpec {
        ManagedMachinePoolSpec {
            sku: "Standard_D2s_v3".to_string(),
            os_disk_size_gb: Some(512),
            ..Default::default()
        }
    }

    fn taints(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Story: Every fixed field is guarded by the table
    #[rstest]
    #[case::sku("spec.sku", |s: &mut ManagedMachinePoolSpec| s.sku = "Standard_D4s_v3".to_string())]
    #[case::os_disk_size("spec.osDiskSizeGB", |s: &mut ManagedMachinePoolSpec| s.os_disk_size_gb = Some(1024))]
    #[case::os_disk_type("spec.osDiskType", |s: &mut ManagedMachinePoolSpec| s.os_disk_type = Some(OsDiskType::Ephemeral))]
    #[case::fips("spec.enableFIPS", |s: &mut ManagedMachinePoolSpec| s.enable_fips = Some(true))]
    #[case::public_ip("spec.enableNodePublicIP", |s: &mut ManagedMachinePoolSpec| s.enable_node_public_ip = Some(true))]
    #[case::priority("spec.scaleSetPriority", |s: &mut ManagedMachinePoolSpec| s.scale_set_priority = Some(ScaleSetPriority::Spot))]
    #[case::max_pods("spec.maxPods", |s: &mut ManagedMachinePoolSpec| s.max_pods = Some(50))]
    #[case::taints("spec.nodeTaints", |s: &mut ManagedMachinePoolSpec| s.node_taints = taints(&["a=b:NoSchedule"]))]
    fn story_changing_fixed_field_is_flagged(
        #[case] path: &str,
        #[case] mutate: fn(&mut ManagedMachinePoolSpec),
    ) {
        let old = base();
        let mut new = base();
        mutate(&mut new);

        let violations = validate_immutable_fields(&new, &old);

        assert_eq!(violations.len(), 1, "exactly one field changed");
        assert_eq!(violations[0].field, path);
        assert_eq!(violations[0].kind, ViolationKind::Immutable);
    }

    #[test]
    fn table_covers_each_field_once() {
        let paths: BTreeSet<_> = IMMUTABLE_FIELDS.iter().map(|f| f.path).collect();
        assert_eq!(paths.len(), IMMUTABLE_FIELDS.len());
        assert_eq!(paths.len(), 8);
    }

    /// Story: Explicit false differs from unset
    #[test]
    fn story_absent_to_false_is_a_change() {
        let old = base();
        let mut new = base();
        new.enable_fips = Some(false);

        let violations = validate_immutable_fields(&new, &old);

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("<unset>"));
        assert!(violations[0].message.ends_with("now false)"));
    }

    #[test]
    fn message_shows_old_and_new_values() {
        let mut old = base();
        old.max_pods = Some(40);
        let mut new = base();
        new.max_pods = Some(50);

        let change = IMMUTABLE_FIELDS
            .iter()
            .find(|f| f.path == "spec.maxPods")
            .and_then(|f| f.diff(&new, &old))
            .expect("maxPods changed");

        assert_eq!(change.old, "40");
        assert_eq!(change.new, "50");
    }

    /// Story: Reordering taints is not a change
    #[test]
    fn story_reordered_taints_are_equal() {
        let mut old = base();
        old.node_taints = taints(&["a=1:NoSchedule", "b=2:NoExecute"]);
        let mut new = base();
        new.node_taints = taints(&["b=2:NoExecute", "a=1:NoSchedule"]);

        assert!(validate_immutable_fields(&new, &old).is_empty());
    }

    #[rstest]
    #[case::added(&["a=1:NoSchedule", "b=2:NoExecute", "c=3:NoSchedule"])]
    #[case::removed(&["a=1:NoSchedule"])]
    #[case::altered(&["a=1:NoSchedule", "b=3:NoExecute"])]
    #[case::cleared(&[])]
    fn taint_set_changes_are_flagged(#[case] new_taints: &[&str]) {
        let mut old = base();
        old.node_taints = taints(&["a=1:NoSchedule", "b=2:NoExecute"]);
        let mut new = base();
        new.node_taints = taints(new_taints);

        let violations = validate_immutable_fields(&new, &old);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "spec.nodeTaints");
    }

    #[test]
    fn mutable_fields_are_ignored() {
        let old = base();
        let mut new = base();
        new.mode = crate::crd::PoolMode::System;
        new.name = Some("renamed".to_string());
        new.auto_scaling = Some(crate::crd::AutoScaling {
            min_count: Some(1),
            max_count: Some(3),
        });

        assert!(validate_immutable_fields(&new, &old).is_empty());
    }
}

//! Defaulting for ManagedMachinePool
//!
//! Runs once on create, before validation. Defaulting never fails: anything
//! it cannot fix is left for the validators to reject.

use crate::crd::ManagedMachinePool;
use crate::LABEL_AGENT_POOL_MODE;

/// Fill in derived values on a pool.
///
/// - `agentpool-mode` label always mirrors `spec.mode`
/// - `spec.name` falls back to `identity` when absent or empty
pub fn apply_defaults(pool: &mut ManagedMachinePool, identity: &str) {
    pool.metadata
        .labels
        .get_or_insert_with(Default::default)
        .insert(LABEL_AGENT_POOL_MODE.to_string(), pool.spec.mode.to_string());

    if pool.spec.effective_name().is_none() {
        pool.spec.name = Some(identity.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ManagedMachinePoolSpec, PoolMode};

    fn pool(name: &str, mode: PoolMode) -> ManagedMachinePool {
        ManagedMachinePool::new(
            name,
            ManagedMachinePoolSpec {
                mode,
                sku: "Standard_D2s_v3".to_string(),
                os_disk_size_gb: Some(512),
                ..Default::default()
            },
        )
    }

    fn mode_label(pool: &ManagedMachinePool) -> Option<&str> {
        pool.metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(LABEL_AGENT_POOL_MODE))
            .map(String::as_str)
    }

    // =========================================================================
    // Defaulting Stories
    // =========================================================================

    /// Story: A fresh system pool gets its mode label and name
    #[test]
    fn story_system_pool_gets_label_and_name() {
        let mut pool = pool("fooName", PoolMode::System);

        apply_defaults(&mut pool, "fooName");

        assert_eq!(mode_label(&pool), Some("System"));
        assert_eq!(pool.spec.name.as_deref(), Some("fooName"));
    }

    /// Story: An empty spec name is treated as unset
    #[test]
    fn story_empty_name_falls_back_to_identity() {
        let mut pool = pool("fooName", PoolMode::System);
        pool.spec.name = Some(String::new());

        apply_defaults(&mut pool, "fooName");

        assert_eq!(pool.spec.name.as_deref(), Some("fooName"));
    }

    /// Story: A user-chosen name is kept
    #[test]
    fn story_explicit_name_is_kept() {
        let mut pool = pool("fooName", PoolMode::System);
        pool.spec.name = Some("barName".to_string());

        apply_defaults(&mut pool, "fooName");

        assert_eq!(pool.spec.name.as_deref(), Some("barName"));
    }

    /// Story: A stale mode label is overwritten, other labels survive
    #[test]
    fn story_mode_label_is_overwritten() {
        let mut pool = pool("pool0", PoolMode::User);
        pool.metadata.labels = Some(
            [
                (LABEL_AGENT_POOL_MODE.to_string(), "System".to_string()),
                ("team".to_string(), "infra".to_string()),
            ]
            .into_iter()
            .collect(),
        );

        apply_defaults(&mut pool, "pool0");

        assert_eq!(mode_label(&pool), Some("User"));
        assert_eq!(
            pool.metadata.labels.as_ref().and_then(|l| l.get("team")),
            Some(&"infra".to_string())
        );
    }

    #[test]
    fn defaulting_is_idempotent() {
        for mode in [PoolMode::System, PoolMode::User] {
            let mut once = pool("pool0", mode);
            apply_defaults(&mut once, "pool0");
            let mut twice = once.clone();
            apply_defaults(&mut twice, "pool0");

            assert_eq!(once.spec, twice.spec);
            assert_eq!(once.metadata.labels, twice.metadata.labels);
        }
    }

    #[test]
    fn defaulting_leaves_invalid_values_alone() {
        let mut pool = pool("pool0", PoolMode::User);
        pool.spec.node_taints = vec!["not-a-taint".to_string()];

        apply_defaults(&mut pool, "pool0");

        assert_eq!(pool.spec.node_taints, vec!["not-a-taint".to_string()]);
    }
}

//! ManagedMachinePool Custom Resource Definition
//!
//! A ManagedMachinePool describes one pool of worker nodes attached to a
//! managed cluster: compute size, disks, autoscaling bounds, kubelet tuning
//! and taints. Most of the machine shape is fixed once the pool exists.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{AutoScaling, KubeletConfig, OsDiskType, PoolMode, ScaleSetPriority};

/// Specification for a ManagedMachinePool
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "ManagedMachinePool",
    plural = "managedmachinepools",
    shortname = "mmp",
    status = "ManagedMachinePoolStatus",
    namespaced,
    printcolumn = r#"{"name":"Mode","type":"string","jsonPath":".spec.mode"}"#,
    printcolumn = r#"{"name":"SKU","type":"string","jsonPath":".spec.sku"}"#,
    printcolumn = r#"{"name":"Ready","type":"boolean","jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedMachinePoolSpec {
    /// Whether the pool hosts system or user workloads
    pub mode: PoolMode,

    /// Compute size of every node in the pool
    pub sku: String,

    /// OS disk size in GB
    #[serde(
        rename = "osDiskSizeGB",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub os_disk_size_gb: Option<i32>,

    /// OS disk kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_disk_type: Option<OsDiskType>,

    /// Name of the pool in the cloud provider; defaults to the resource name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Run FIPS-enabled node images
    #[serde(rename = "enableFIPS", default, skip_serializing_if = "Option::is_none")]
    pub enable_fips: Option<bool>,

    /// Give every node a public IP
    #[serde(
        rename = "enableNodePublicIP",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_node_public_ip: Option<bool>,

    /// Regular or spot capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_set_priority: Option<ScaleSetPriority>,

    /// Maximum pods per node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pods: Option<i32>,

    /// Taints in `key=value:effect` form applied to every node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_taints: Vec<String>,

    /// Autoscaler bounds; absent disables autoscaling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scaling: Option<AutoScaling>,

    /// Kubelet tuning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubelet_config: Option<KubeletConfig>,
}

impl ManagedMachinePoolSpec {
    /// Pool name as it will be sent to the cloud provider, if resolved
    pub fn effective_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Unsafe sysctl patterns, empty when kubelet config is absent
    pub fn allowed_unsafe_sysctls(&self) -> &[String] {
        self.kubelet_config
            .as_ref()
            .and_then(|k| k.allowed_unsafe_sysctls.as_deref())
            .unwrap_or_default()
    }
}

/// Status for a ManagedMachinePool, written by the reconciler
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedMachinePoolStatus {
    /// Whether the pool is provisioned and ready
    #[serde(default)]
    pub ready: bool,

    /// Number of nodes currently in the pool
    #[serde(default)]
    pub replicas: i32,
}

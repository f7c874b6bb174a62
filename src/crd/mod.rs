//! Custom Resource Definitions for pool admission
//!
//! This module contains the ManagedMachinePool CRD and its supporting types.

mod pool;
mod types;

pub use pool::{ManagedMachinePool, ManagedMachinePoolSpec, ManagedMachinePoolStatus};
pub use types::{
    AutoScaling, KubeletConfig, NodeTaint, OsDiskType, PoolMode, ScaleSetPriority, TaintEffect,
    TaintParseError,
};

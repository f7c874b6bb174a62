//! Pool Admission - defaulting and validating webhook for ManagedMachinePool
//!
//! A ManagedMachinePool describes a pool of worker nodes attached to a managed
//! Kubernetes cluster. This crate guards the create/update path of that
//! resource: it fills in values the user omitted and rejects specifications
//! that are malformed or that change fields fixed at creation.
//!
//! # Modules
//!
//! - [`crd`] - ManagedMachinePool Custom Resource Definition
//! - [`admission`] - Defaulting, field rules and immutability checks
//! - [`webhook`] - Admission webhook HTTP handlers and server
//! - [`config`] - Webhook server configuration
//! - [`telemetry`] - Logging initialization
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod admission;
pub mod config;
pub mod crd;
pub mod error;
pub mod telemetry;
pub mod webhook;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Label mirroring `spec.mode`, owned by the defaulter
pub const LABEL_AGENT_POOL_MODE: &str = "agentpool-mode";

/// Default listen address for the webhook server
pub const DEFAULT_WEBHOOK_ADDR: &str = "0.0.0.0:9443";

//! kaas API Library
//!
//! Provisions applications and managed PostgreSQL services onto a
//! Kubernetes cluster and keeps a health ledger of probe results.

// Core modules
pub mod config;
pub mod error;
pub mod validation;

// Logging configuration
pub mod logging;

// Application state and HTTP surface
pub mod routes;
pub mod state;
pub use state::AppState;

// Kubernetes integration
pub mod kubernetes;

// Provisioning and status
pub mod provisioning;
pub mod status;

// Health ledger and probing
pub mod ledger;
pub mod probe;

// Health checks and readiness probes
pub mod health;

// Graceful shutdown handling
pub mod shutdown;

//! Kubernetes workload management
//!
//! Handles Pods, Deployments, StatefulSets and CronJobs.

pub mod deployments;
pub mod jobs;
pub mod pods;
pub mod statefulsets;

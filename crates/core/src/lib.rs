//! Core domain types for the Z-Image generation platform.
//!
//! Shared by the HTTP client (`zimage-studio`) and the job-state
//! synchronization engine (`zimage-tracker`): job records and statuses,
//! the sparse wire-level snapshot shape, generation request parameters,
//! the merge policy applied when fresh status data arrives, and the
//! [`JobService`](crate::service::JobService) trait that abstracts the
//! remote generation backend.

pub mod format;
pub mod job;
pub mod params;
pub mod reconcile;
pub mod service;
pub mod status;
pub mod types;

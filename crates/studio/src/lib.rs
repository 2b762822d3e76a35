//! HTTP client for the Z-Image Studio generation backend.
//!
//! Wraps the backend REST API (job submission, history listing, per-job
//! status, deletion) using [`reqwest`], and implements
//! [`JobService`](zimage_core::service::JobService) so the
//! synchronization engine can run against a live backend.

pub mod api;

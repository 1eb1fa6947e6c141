//! HTTP front end for the migration cost estimator
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests can drive the real router.

pub mod api;
pub mod config;

//! Service layer for business logic
//!
//! Shared between the HTTP edge and the CLI.

mod tracker_service;

pub use tracker_service::*;

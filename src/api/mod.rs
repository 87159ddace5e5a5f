//! HTTP edge
//!
//! Maps request paths to tracker operations. Holds no state of its own.

pub mod middleware;
pub mod services;

//! reflinker - a URL shortener with per-code referral tracking
//!
//! Every short code is an independent consistency domain: all reads and
//! writes addressed to one code are serialized, while different codes run
//! fully in parallel.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `storage`: Per-code key-value record stores (file, memory)
//! - `entity`: Per-code consistency boundary and the registry mapping codes to entities
//! - `services`: Shorten and Resolve & Track flows
//! - `api`: HTTP edge (actix-web)
//! - `interfaces`: Command-line interface
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

#[cfg(feature = "server")]
pub mod api;
pub mod cli;
pub mod config;
pub mod entity;
pub mod errors;
#[cfg(feature = "cli")]
pub mod interfaces;
#[cfg(feature = "server")]
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

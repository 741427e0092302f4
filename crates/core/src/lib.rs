//! Speaker Lab Core - Shared domain types.
//!
//! This crate provides the types used by every Speaker Lab component:
//! - `web` - The HTTP service (analysis, reports, accounts)
//! - `cli` - Command-line account administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no file access. Everything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Email addresses, subscription tiers, analysis schemas, score mappings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

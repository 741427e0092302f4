//! Speaker Lab web service library.
//!
//! Tiered talk analysis for TEDxBrașov speakers: a transcript goes to a
//! completion model with the prompt for the account's tier, the reply is
//! checked against that tier's schema, and the result is shown on the page
//! and rendered as a PDF scorecard.
//!
//! The binary in `main.rs` wires this library to the network; integration
//! tests drive [`routes::build_router`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

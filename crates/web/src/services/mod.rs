//! Business logic services for Speaker Lab.
//!
//! # Services
//!
//! - `analysis` - Tier dispatch, prompt templates, reply extraction
//! - `auth` - Password accounts
//! - `completion` - Chat-completion provider client
//! - `report` - PDF scorecards and radar charts

pub mod analysis;
pub mod auth;
pub mod completion;
pub mod report;

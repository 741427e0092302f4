//! Domain models for Speaker Lab.
//!
//! Record types are what the flat-file stores hold; domain types are what the
//! rest of the service works with.

pub mod history;
pub mod session;
pub mod user;

mod timestamp;

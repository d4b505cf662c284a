//! Common Test Utilities
//!
//! Shared fixtures for campaign data and ready-to-use controllers.

pub mod fixtures;

pub use fixtures::*;

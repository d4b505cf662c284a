//! Crate-level tests that span several modules.
//!
//! - `common`: campaign fixtures and controller builders
//! - `mocks`: scripted `LLMProvider` mocks
//! - `unit`: controller, storage and end-to-end scenario tests
//! - `property`: proptest invariants for merging and input handling

pub mod common;
pub mod mocks;
mod property;
mod unit;

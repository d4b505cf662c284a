/// Campaign Forge - AI-assisted TTRPG campaign authoring (TUI Edition)
///
/// Core library providing campaign generation and editing through an
/// OpenAI-compatible completion API, local persistence and text export.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Terminal user interface.
//!
//! Elm-style: [`app::AppState`] owns all UI state, views turn key events
//! into [`events::Action`]s, and model requests run on background tasks
//! that report back through the app's event channel.

pub mod app;
pub mod events;
pub mod layout;
pub mod services;
pub mod theme;
pub mod views;
pub mod widgets;

//! Teal & coral palette for the campaign TUI.
//!
//! Views take colors and styles from here rather than inline `Color::*`
//! literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

// ── Primary palette ─────────────────────────────────────────────────────────

/// Teal. Active items and focused borders.
pub const PRIMARY: Color = Color::Rgb(0x00, 0x80, 0x80);
/// Light teal. Hints and secondary focus.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x00, 0x96, 0x88);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Coral. Titles and calls to action.
pub const ACCENT: Color = Color::Rgb(0xFF, 0x7F, 0x50);

/// Charcoal. Base background and badge text.
pub const BG_BASE: Color = Color::Rgb(0x0A, 0x19, 0x19);

// ── Text ────────────────────────────────────────────────────────────────────

/// Body text.
pub const TEXT: Color = Color::Rgb(0xE0, 0xE0, 0xE0);
/// Secondary labels and idle status.
pub const TEXT_MUTED: Color = Color::Rgb(0x80, 0x80, 0x80);
/// Unfocused borders and faint hints.
pub const TEXT_DIM: Color = Color::Rgb(0x50, 0x50, 0x50);

// ── Semantic ────────────────────────────────────────────────────────────────

/// Failures and field errors.
pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
/// Confirmations.
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
/// Rejected actions and validation notices.
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
/// Informational notices.
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

// ── Domain ──────────────────────────────────────────────────────────────────

/// NPC names. Lavender.
pub const NPC: Color = Color::Rgb(0xCE, 0x93, 0xD8);
/// The campaign's main antagonist.
pub const BBEG: Color = Color::Rgb(0xE5, 0x39, 0x35);

// ── Style helpers ───────────────────────────────────────────────────────────

/// Bold coral, for campaign titles.
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Bold teal, for section headers.
pub fn heading() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

/// Border of the focused pane.
pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

/// Border of unfocused panes.
pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Selected list row.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Secondary text.
pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

/// Placeholder and disabled text.
pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Inline validation message under a form field.
pub fn field_error() -> Style {
    Style::default().fg(ERROR)
}

/// Key hint style (e.g., "[q]:quit").
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Badge shown while a model request is in flight.
pub fn busy_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY_LIGHT)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

/// Bordered block with a focused border.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// Bordered block with the default border.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}

/// Pick the focused or default block.
pub fn block(title: &str, focused: bool) -> Block<'_> {
    if focused {
        block_focused(title)
    } else {
        block_default(title)
    }
}

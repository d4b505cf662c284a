//! Busy indicator for in-flight model requests.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::campaign::CampaignOperation;
use crate::tui::theme;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for the given tick count. Advances every other tick.
pub fn spinner_frame(tick: u64) -> &'static str {
    FRAMES[((tick / 2) % FRAMES.len() as u64) as usize]
}

/// Human wording for what the model is doing.
pub fn busy_label(operation: CampaignOperation) -> &'static str {
    match operation {
        CampaignOperation::Generate => "Generating campaign",
        CampaignOperation::EditNpc => "Rewriting NPC",
        CampaignOperation::EditSession => "Rewriting session",
        CampaignOperation::AddSession => "Writing new session",
        CampaignOperation::AddNpc => "Writing new NPC",
    }
}

/// "  ⠋ Generating campaign..." in the accent color.
pub fn progress_line(operation: CampaignOperation, tick: u64) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{} ", spinner_frame(tick)),
            Style::default().fg(theme::ACCENT),
        ),
        Span::styled(
            format!("{}...", busy_label(operation)),
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

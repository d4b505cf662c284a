//! Campaign list: saved campaigns with selection and deletion.
//!
//! j/k move, Enter opens the campaign in the viewer, n starts a new one and
//! d asks before deleting.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::campaign::{CampaignController, CampaignResult};
use crate::tui::events::{Action, InputResult};
use crate::tui::theme;

pub struct CampaignListState {
    selected: usize,
    confirm_delete: bool,
}

impl Default for CampaignListState {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignListState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            confirm_delete: false,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn has_modal(&self) -> bool {
        self.confirm_delete
    }

    /// Point the cursor at the active campaign, if any.
    pub fn sync_selection(&mut self, controller: &CampaignController) {
        let campaigns = controller.campaigns();
        if let Some(pos) = controller
            .selected_id()
            .and_then(|id| campaigns.iter().position(|c| c.id == id))
        {
            self.selected = pos;
        }
        self.clamp(campaigns.len());
    }

    fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, controller: &CampaignController) -> InputResult {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return InputResult::Ignored;
        };

        let campaigns = controller.campaigns();
        self.clamp(campaigns.len());

        if self.confirm_delete {
            return match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm_delete = false;
                    match campaigns.get(self.selected) {
                        Some(c) => InputResult::Action(Action::DeleteCampaign(c.id.clone())),
                        None => InputResult::Consumed,
                    }
                }
                _ => {
                    self.confirm_delete = false;
                    InputResult::Consumed
                }
            };
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            return InputResult::Ignored;
        }

        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < campaigns.len() {
                    self.selected += 1;
                }
                InputResult::Consumed
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                InputResult::Consumed
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.selected = 0;
                InputResult::Consumed
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = campaigns.len().saturating_sub(1);
                InputResult::Consumed
            }
            KeyCode::Enter => match campaigns.get(self.selected) {
                Some(c) => InputResult::Action(Action::SelectCampaign(c.id.clone())),
                None => InputResult::Consumed,
            },
            KeyCode::Char('n') => InputResult::Action(Action::FocusCreate),
            KeyCode::Char('d') | KeyCode::Delete => {
                if !campaigns.is_empty() && !controller.is_busy() {
                    self.confirm_delete = true;
                }
                InputResult::Consumed
            }
            _ => InputResult::Ignored,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, controller: &CampaignController) {
        let block = theme::block_focused("Campaigns");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = build_lines(controller.campaigns(), self.selected, controller.selected_id());
        let visible = inner.height as usize;
        let selected_line = HEADER_LINES + self.selected;
        let scroll = if visible > 0 && selected_line >= visible {
            selected_line + 1 - visible
        } else {
            0
        };
        frame.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), inner);

        if self.confirm_delete {
            if let Some(campaign) = controller.campaigns().get(self.selected) {
                render_confirm(frame, area, &campaign.title);
            }
        }
    }
}

const HEADER_LINES: usize = 3;

fn build_lines(
    campaigns: &[CampaignResult],
    selected: usize,
    active_id: Option<&str>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(campaigns.len() + HEADER_LINES + 2);

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        format!("  {:<40} {:>8} {:>6}", "Title", "Sessions", "NPCs"),
        theme::muted().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("  {}", "─".repeat(58)),
        theme::dim(),
    )));

    if campaigns.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                "No campaigns yet. Press n to create one.",
                theme::muted(),
            ),
        ]));
        return lines;
    }

    for (i, campaign) in campaigns.iter().enumerate() {
        let is_selected = i == selected;
        let cursor = if is_selected { "▸ " } else { "  " };
        let marker = if active_id == Some(campaign.id.as_str()) {
            "●"
        } else {
            " "
        };
        let style = if is_selected {
            theme::highlight()
        } else {
            Style::default().fg(theme::TEXT)
        };

        lines.push(Line::from(vec![
            Span::styled(cursor.to_string(), style),
            Span::styled(format!("{marker} "), Style::default().fg(theme::SUCCESS)),
            Span::styled(format!("{:<38}", truncate(&campaign.title, 38)), style),
            Span::styled(
                format!(" {:>8} {:>6}", campaign.sessions.len(), campaign.npcs.len()),
                theme::muted(),
            ),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "  Enter:open  n:new  d:delete",
        theme::key_hint(),
    )));
    lines
}

fn render_confirm(frame: &mut Frame, area: Rect, title: &str) {
    let modal = crate::tui::app::centered_rect(50, 25, area);
    frame.render_widget(Clear, modal);
    let block = theme::block_focused("Delete Campaign").border_style(Style::default().fg(theme::ERROR));
    let body = Paragraph::new(vec![
        Line::raw(""),
        Line::from(vec![
            Span::raw("  Delete "),
            Span::styled(format!("\"{}\"", truncate(title, 40)), theme::title()),
            Span::raw("?"),
        ]),
        Line::raw(""),
        Line::from(Span::styled(
            "  This cannot be undone. y/Enter:delete  any other key:cancel",
            theme::key_hint(),
        )),
    ])
    .block(block)
    .wrap(Wrap { trim: false });
    frame.render_widget(body, modal);
}

/// Shorten to `max` chars, ending in an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

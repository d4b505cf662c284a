//! Dialogs opened from the campaign viewer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::campaign::{CampaignCommand, InsertPosition};
use crate::tui::app::centered_rect;
use crate::tui::events::Action;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

#[derive(Debug, Clone)]
pub enum ModalKind {
    EditNpc {
        npc_id: String,
        name: String,
        instruction: InputBuffer,
    },
    EditSession {
        session_id: String,
        label: String,
        instruction: InputBuffer,
    },
    AddNpc {
        instruction: InputBuffer,
    },
    AddSession {
        anchor_session_id: String,
        anchor_label: String,
        position: InsertPosition,
        instruction: InputBuffer,
    },
    TitleSummary {
        title: InputBuffer,
        summary: InputBuffer,
        on_summary: bool,
    },
    Export {
        filename: InputBuffer,
    },
    ConfirmDelete {
        campaign_id: String,
        title: String,
    },
}

/// What the viewer should do after a modal saw a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    Consumed,
    Close,
    Submit(Action),
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub kind: ModalKind,
    error: Option<String>,
}

impl Modal {
    pub fn new(kind: ModalKind) -> Self {
        Self { kind, error: None }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    fn title(&self) -> &'static str {
        match &self.kind {
            ModalKind::EditNpc { .. } => "Edit NPC",
            ModalKind::EditSession { .. } => "Edit Session",
            ModalKind::AddNpc { .. } => "Add NPC",
            ModalKind::AddSession { .. } => "Add Session",
            ModalKind::TitleSummary { .. } => "Title & Summary",
            ModalKind::Export { .. } => "Export as Text",
            ModalKind::ConfirmDelete { .. } => "Delete Campaign",
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ModalOutcome {
        if key.code == KeyCode::Esc {
            return ModalOutcome::Close;
        }

        if let ModalKind::ConfirmDelete { campaign_id, .. } = &self.kind {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    ModalOutcome::Submit(Action::DeleteCampaign(campaign_id.clone()))
                }
                _ => ModalOutcome::Close,
            };
        }

        if key.code == KeyCode::Enter && !key.modifiers.contains(KeyModifiers::SHIFT) {
            return self.submit();
        }

        let toggled = match &mut self.kind {
            ModalKind::AddSession { position, .. } if key.code == KeyCode::Tab => {
                *position = position.toggle();
                true
            }
            ModalKind::TitleSummary { on_summary, .. }
                if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) =>
            {
                *on_summary = !*on_summary;
                true
            }
            _ => false,
        };

        if !toggled {
            if let Some(buffer) = self.active_buffer() {
                if buffer.handle_key(key) {
                    self.error = None;
                }
            }
        }
        ModalOutcome::Consumed
    }

    fn active_buffer(&mut self) -> Option<&mut InputBuffer> {
        match &mut self.kind {
            ModalKind::EditNpc { instruction, .. }
            | ModalKind::EditSession { instruction, .. }
            | ModalKind::AddNpc { instruction }
            | ModalKind::AddSession { instruction, .. } => Some(instruction),
            ModalKind::TitleSummary {
                title,
                summary,
                on_summary,
            } => Some(if *on_summary { summary } else { title }),
            ModalKind::Export { filename } => Some(filename),
            ModalKind::ConfirmDelete { .. } => None,
        }
    }

    fn submit(&mut self) -> ModalOutcome {
        let action = match &self.kind {
            ModalKind::EditNpc {
                npc_id, instruction, ..
            } => Self::instruction(instruction).map(|instruction| CampaignCommand::EditNpc {
                npc_id: npc_id.clone(),
                instruction,
            }),
            ModalKind::EditSession {
                session_id,
                instruction,
                ..
            } => Self::instruction(instruction).map(|instruction| CampaignCommand::EditSession {
                session_id: session_id.clone(),
                instruction,
            }),
            ModalKind::AddNpc { instruction } => {
                Self::instruction(instruction).map(|instruction| CampaignCommand::AddNpc { instruction })
            }
            ModalKind::AddSession {
                anchor_session_id,
                position,
                instruction,
                ..
            } => Self::instruction(instruction).map(|instruction| CampaignCommand::AddSession {
                anchor_session_id: anchor_session_id.clone(),
                instruction,
                position: *position,
            }),
            ModalKind::TitleSummary { title, summary, .. } => {
                if title.is_empty() {
                    Err("Title cannot be empty".to_string())
                } else {
                    return ModalOutcome::Submit(Action::UpdateTitleSummary {
                        title: title.text().trim().to_string(),
                        summary: summary.text().trim().to_string(),
                    });
                }
            }
            ModalKind::Export { filename } => {
                if filename.is_empty() {
                    Err("Filename cannot be empty".to_string())
                } else {
                    return ModalOutcome::Submit(Action::Export(filename.text().trim().to_string()));
                }
            }
            ModalKind::ConfirmDelete { .. } => return ModalOutcome::Close,
        };

        match action {
            Ok(command) => ModalOutcome::Submit(Action::Dispatch(command)),
            Err(msg) => {
                self.error = Some(msg);
                ModalOutcome::Consumed
            }
        }
    }

    fn instruction(buffer: &InputBuffer) -> Result<String, String> {
        if buffer.is_empty() {
            Err("Instruction cannot be empty".to_string())
        } else {
            Ok(buffer.text().trim().to_string())
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let modal_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, modal_area);

        let mut block = theme::block_focused(self.title());
        if matches!(self.kind, ModalKind::ConfirmDelete { .. }) {
            block = block.border_style(Style::default().fg(theme::ERROR));
        }
        let body = Paragraph::new(self.build_lines())
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(body, modal_area);
    }

    pub fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::raw("")];
        let hint: &str;

        match &self.kind {
            ModalKind::EditNpc {
                name, instruction, ..
            } => {
                lines.push(context_line("Editing", name));
                lines.push(Line::raw(""));
                push_input(&mut lines, "Instruction", instruction, true);
                hint = "Enter:send  Esc:cancel";
            }
            ModalKind::EditSession {
                label, instruction, ..
            } => {
                lines.push(context_line("Editing", label));
                lines.push(Line::raw(""));
                push_input(&mut lines, "Instruction", instruction, true);
                hint = "Enter:send  Esc:cancel";
            }
            ModalKind::AddNpc { instruction } => {
                lines.push(Line::from(Span::styled(
                    "  Describe the character to add.",
                    theme::muted(),
                )));
                lines.push(Line::raw(""));
                push_input(&mut lines, "Instruction", instruction, true);
                hint = "Enter:send  Esc:cancel";
            }
            ModalKind::AddSession {
                anchor_label,
                position,
                instruction,
                ..
            } => {
                lines.push(Line::from(vec![
                    Span::styled("  Insert ", theme::muted()),
                    Span::styled(position.as_str().to_string(), theme::highlight()),
                    Span::styled(" ", theme::muted()),
                    Span::styled(anchor_label.clone(), Style::default().fg(theme::TEXT)),
                ]));
                lines.push(Line::raw(""));
                push_input(&mut lines, "Instruction", instruction, true);
                hint = "Enter:send  Tab:before/after  Esc:cancel";
            }
            ModalKind::TitleSummary {
                title,
                summary,
                on_summary,
            } => {
                push_input(&mut lines, "Title", title, !*on_summary);
                lines.push(Line::raw(""));
                push_input(&mut lines, "Summary", summary, *on_summary);
                hint = "Enter:save  Tab:switch field  Esc:cancel";
            }
            ModalKind::Export { filename } => {
                push_input(&mut lines, "Filename", filename, true);
                lines.push(Line::from(Span::styled(
                    "  .txt is added automatically",
                    theme::dim(),
                )));
                hint = "Enter:export  Esc:cancel";
            }
            ModalKind::ConfirmDelete { title, .. } => {
                lines.push(Line::from(vec![
                    Span::raw("  Delete "),
                    Span::styled(format!("\"{title}\""), theme::title()),
                    Span::raw("?"),
                ]));
                lines.push(Line::raw(""));
                lines.push(Line::from(Span::styled(
                    "  This cannot be undone.",
                    Style::default().fg(theme::WARNING),
                )));
                hint = "y/Enter:delete  any other key:cancel";
            }
        }

        if let Some(err) = &self.error {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                format!("  ✗ {err}"),
                theme::field_error(),
            )));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(format!("  {hint}"), theme::key_hint())));
        lines
    }
}

fn context_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label} "), theme::muted()),
        Span::styled(value.to_string(), theme::title()),
    ])
}

fn push_input(lines: &mut Vec<Line<'static>>, label: &str, buffer: &InputBuffer, focused: bool) {
    let label_style = if focused { theme::highlight() } else { theme::muted() };
    lines.push(Line::from(Span::styled(format!("  {label}"), label_style)));
    let mut spans = vec![Span::raw("  > ")];
    spans.extend(buffer.line(focused).spans);
    lines.push(Line::from(spans));
}

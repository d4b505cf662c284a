//! Campaign viewer.
//!
//! Shows the active campaign as a sessions list and an NPC roster beside a
//! detail pane for the highlighted item. Every edit goes through a modal
//! (see `modals.rs`); model-backed edits come back as `Action::Dispatch`.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::core::campaign::{CampaignController, CampaignResult, InsertPosition, Npc, Session};
use crate::tui::events::{Action, InputResult};
use crate::tui::layout::master_detail;
use crate::tui::theme;
use crate::tui::views::campaign_list::truncate;
use crate::tui::views::modals::{Modal, ModalKind, ModalOutcome};
use crate::tui::widgets::input_buffer::InputBuffer;
use crate::tui::widgets::progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Sessions,
    Npcs,
}

pub struct CampaignViewerState {
    pane: Pane,
    session_idx: usize,
    npc_idx: usize,
    detail_scroll: u16,
    modal: Option<Modal>,
}

impl Default for CampaignViewerState {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignViewerState {
    pub fn new() -> Self {
        Self {
            pane: Pane::Sessions,
            session_idx: 0,
            npc_idx: 0,
            detail_scroll: 0,
            modal: None,
        }
    }

    /// Forget cursor positions, e.g. after switching campaigns.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Keep cursors inside the campaign after it changed shape.
    pub fn clamp(&mut self, campaign: Option<&CampaignResult>) {
        let (sessions, npcs) = campaign
            .map(|c| (c.sessions.len(), c.npcs.len()))
            .unwrap_or((0, 0));
        self.session_idx = self.session_idx.min(sessions.saturating_sub(1));
        self.npc_idx = self.npc_idx.min(npcs.saturating_sub(1));
    }

    fn selected_session<'a>(&self, campaign: &'a CampaignResult) -> Option<&'a Session> {
        campaign.sessions.get(self.session_idx)
    }

    fn selected_npc<'a>(&self, campaign: &'a CampaignResult) -> Option<&'a Npc> {
        campaign.npcs.get(self.npc_idx)
    }

    // ── Modals ───────────────────────────────────────────────────────────

    fn open_edit(&mut self, campaign: &CampaignResult) {
        let kind = match self.pane {
            Pane::Sessions => self.selected_session(campaign).map(|s| ModalKind::EditSession {
                session_id: s.id.clone(),
                label: session_label(s),
                instruction: InputBuffer::new(),
            }),
            Pane::Npcs => self.selected_npc(campaign).map(|n| ModalKind::EditNpc {
                npc_id: n.id.clone(),
                name: n.name.clone(),
                instruction: InputBuffer::new(),
            }),
        };
        self.modal = kind.map(Modal::new);
    }

    fn open_add_session(&mut self, campaign: &CampaignResult) {
        let (anchor_session_id, anchor_label) = match self.selected_session(campaign) {
            Some(s) => (s.id.clone(), session_label(s)),
            None => (String::new(), "at the start".to_string()),
        };
        self.modal = Some(Modal::new(ModalKind::AddSession {
            anchor_session_id,
            anchor_label,
            position: InsertPosition::After,
            instruction: InputBuffer::new(),
        }));
    }

    fn open_title_summary(&mut self, campaign: &CampaignResult) {
        self.modal = Some(Modal::new(ModalKind::TitleSummary {
            title: InputBuffer::with_text(campaign.title.clone()),
            summary: InputBuffer::with_text(campaign.summary.clone()),
            on_summary: false,
        }));
    }

    fn open_export(&mut self, campaign: &CampaignResult) {
        self.modal = Some(Modal::new(ModalKind::Export {
            filename: InputBuffer::with_text(campaign.title.clone()),
        }));
    }

    fn open_delete(&mut self, campaign: &CampaignResult) {
        self.modal = Some(Modal::new(ModalKind::ConfirmDelete {
            campaign_id: campaign.id.clone(),
            title: campaign.title.clone(),
        }));
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, controller: &CampaignController) -> InputResult {
        let Event::Key(key) = event else {
            return InputResult::Ignored;
        };
        if key.kind != KeyEventKind::Press {
            return InputResult::Ignored;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return InputResult::Ignored;
        }

        if let Some(modal) = self.modal.as_mut() {
            return match modal.handle_key(key) {
                ModalOutcome::Consumed => InputResult::Consumed,
                ModalOutcome::Close => {
                    self.modal = None;
                    InputResult::Consumed
                }
                ModalOutcome::Submit(Action::Dispatch(_)) if controller.is_busy() => {
                    modal.set_error("Wait for the current request to finish");
                    InputResult::Consumed
                }
                ModalOutcome::Submit(action) => {
                    self.modal = None;
                    InputResult::Action(action)
                }
            };
        }

        let Some(campaign) = controller.active() else {
            return match key.code {
                KeyCode::Esc => InputResult::Action(Action::FocusCampaigns),
                KeyCode::Char('n') => InputResult::Action(Action::FocusCreate),
                _ => InputResult::Ignored,
            };
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(campaign, 1);
                InputResult::Consumed
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(campaign, -1);
                InputResult::Consumed
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.pane = Pane::Sessions;
                self.detail_scroll = 0;
                InputResult::Consumed
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.pane = Pane::Npcs;
                self.detail_scroll = 0;
                InputResult::Consumed
            }
            KeyCode::PageDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(5);
                InputResult::Consumed
            }
            KeyCode::PageUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(5);
                InputResult::Consumed
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.open_edit(campaign);
                InputResult::Consumed
            }
            KeyCode::Char('s') => {
                self.open_add_session(campaign);
                InputResult::Consumed
            }
            KeyCode::Char('a') => {
                self.open_add_npc();
                InputResult::Consumed
            }
            KeyCode::Char('t') => {
                self.open_title_summary(campaign);
                InputResult::Consumed
            }
            KeyCode::Char('x') => {
                self.open_export(campaign);
                InputResult::Consumed
            }
            KeyCode::Char('D') => {
                self.open_delete(campaign);
                InputResult::Consumed
            }
            KeyCode::Esc => InputResult::Action(Action::FocusCampaigns),
            _ => InputResult::Ignored,
        }
    }

    fn open_add_npc(&mut self) {
        self.modal = Some(Modal::new(ModalKind::AddNpc {
            instruction: InputBuffer::new(),
        }));
    }

    fn move_selection(&mut self, campaign: &CampaignResult, delta: isize) {
        let (idx, len) = match self.pane {
            Pane::Sessions => (&mut self.session_idx, campaign.sessions.len()),
            Pane::Npcs => (&mut self.npc_idx, campaign.npcs.len()),
        };
        if len == 0 {
            return;
        }
        *idx = idx.saturating_add_signed(delta).min(len - 1);
        self.detail_scroll = 0;
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, controller: &CampaignController, tick: u64) {
        let Some(campaign) = controller.active() else {
            let block = theme::block_focused("Campaign");
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let empty = Paragraph::new(vec![
                Line::raw(""),
                Line::from(Span::styled(
                    "  No campaign selected. Pick one from Campaigns (1) or press n to create one.",
                    theme::muted(),
                )),
            ]);
            frame.render_widget(empty, inner);
            return;
        };

        let block = theme::block_focused(&campaign.title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(4), // Summary
            Constraint::Min(5),    // Lists + detail
            Constraint::Length(1), // Footer
        ])
        .split(inner);

        let summary = Paragraph::new(vec![
            Line::from(Span::styled(campaign.summary.clone(), Style::default().fg(theme::TEXT))),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(summary, rows[0]);

        let (lists, detail) = master_detail(rows[1], 35);
        let list_rows =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).split(lists);

        let sessions_block = theme::block("Sessions", self.pane == Pane::Sessions);
        let sessions_inner = sessions_block.inner(list_rows[0]);
        frame.render_widget(sessions_block, list_rows[0]);
        frame.render_widget(
            Paragraph::new(session_list_lines(campaign, self.session_idx, self.pane == Pane::Sessions))
                .scroll((scroll_for(self.session_idx, sessions_inner.height), 0)),
            sessions_inner,
        );

        let npcs_block = theme::block("NPCs", self.pane == Pane::Npcs);
        let npcs_inner = npcs_block.inner(list_rows[1]);
        frame.render_widget(npcs_block, list_rows[1]);
        frame.render_widget(
            Paragraph::new(npc_list_lines(campaign, self.npc_idx, self.pane == Pane::Npcs))
                .scroll((scroll_for(self.npc_idx, npcs_inner.height), 0)),
            npcs_inner,
        );

        let detail_lines = match self.pane {
            Pane::Sessions => self
                .selected_session(campaign)
                .map(|s| session_detail_lines(campaign, s)),
            Pane::Npcs => self
                .selected_npc(campaign)
                .map(|n| npc_detail_lines(campaign, n)),
        }
        .unwrap_or_else(|| vec![Line::from(Span::styled("  Nothing here yet.", theme::muted()))]);
        frame.render_widget(
            Paragraph::new(detail_lines)
                .block(theme::block_default("Details"))
                .wrap(Wrap { trim: false })
                .scroll((self.detail_scroll, 0)),
            detail,
        );

        frame.render_widget(
            Paragraph::new(footer_line(controller, tick)),
            rows[2],
        );

        if let Some(modal) = &self.modal {
            modal.render(frame, area);
        }
    }
}

fn scroll_for(selected: usize, height: u16) -> u16 {
    let height = height as usize;
    if height > 0 && selected >= height {
        (selected + 1 - height) as u16
    } else {
        0
    }
}

fn session_label(session: &Session) -> String {
    format!("Session {}: {}", session.number, session.title)
}

fn footer_line(controller: &CampaignController, tick: u64) -> Line<'static> {
    if let Some(operation) = controller.busy_operation() {
        return progress::progress_line(operation, tick);
    }
    if let Some(err) = controller.error() {
        return Line::from(Span::styled(
            format!("  ✗ {err}"),
            Style::default().fg(theme::ERROR),
        ));
    }
    Line::from(Span::styled(
        "  e:edit  s:add session  a:add NPC  t:title  x:export  D:delete  h/l:pane",
        theme::key_hint(),
    ))
}

// ── Line builders ────────────────────────────────────────────────────────────

fn session_list_lines(campaign: &CampaignResult, selected: usize, focused: bool) -> Vec<Line<'static>> {
    if campaign.sessions.is_empty() {
        return vec![Line::from(Span::styled("  No sessions. Press s to add one.", theme::muted()))];
    }
    campaign
        .sessions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let is_selected = i == selected;
            let cursor = if is_selected && focused { "▸ " } else { "  " };
            let style = if is_selected {
                theme::highlight()
            } else {
                Style::default().fg(theme::TEXT)
            };
            Line::from(vec![
                Span::styled(cursor.to_string(), style),
                Span::styled(format!("{:>3}. ", s.number), theme::muted()),
                Span::styled(truncate(&s.title, 40), style),
            ])
        })
        .collect()
}

fn npc_list_lines(campaign: &CampaignResult, selected: usize, focused: bool) -> Vec<Line<'static>> {
    if campaign.npcs.is_empty() {
        return vec![Line::from(Span::styled("  No NPCs. Press a to add one.", theme::muted()))];
    }
    campaign
        .npcs
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let is_selected = i == selected;
            let cursor = if is_selected && focused { "▸ " } else { "  " };
            let name_style = if is_selected {
                theme::highlight()
            } else {
                Style::default().fg(npc_color(n))
            };
            let mut spans = vec![
                Span::styled(cursor.to_string(), name_style),
                Span::styled(truncate(&n.name, 30), name_style),
            ];
            if n.is_bbeg {
                spans.push(Span::styled(
                    " [BBEG]",
                    Style::default().fg(theme::BBEG).add_modifier(Modifier::BOLD),
                ));
            }
            if !n.alive {
                spans.push(Span::styled(" †", theme::dim()));
            }
            Line::from(spans)
        })
        .collect()
}

fn npc_color(npc: &Npc) -> ratatui::style::Color {
    if !npc.alive {
        theme::TEXT_DIM
    } else if npc.is_bbeg {
        theme::BBEG
    } else {
        theme::NPC
    }
}

fn session_detail_lines(campaign: &CampaignResult, session: &Session) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(session_label(session), theme::title())),
        Line::raw(""),
        Line::from(Span::styled(session.summary.clone(), Style::default().fg(theme::TEXT))),
        Line::raw(""),
        Line::from(Span::styled("Events", theme::heading())),
    ];

    if session.events.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", theme::dim())));
    }
    for event in &session.events {
        lines.push(Line::from(vec![
            Span::styled("  • ", theme::muted()),
            Span::styled(event.clone(), Style::default().fg(theme::TEXT)),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("NPCs", theme::heading())));
    if session.npcs.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", theme::dim())));
    }
    for id in &session.npcs {
        let style = match campaign.npc(id) {
            Some(npc) => Style::default().fg(npc_color(npc)),
            None => theme::dim(),
        };
        lines.push(Line::from(vec![
            Span::styled("  • ", theme::muted()),
            Span::styled(campaign.npc_name(id).to_string(), style),
        ]));
    }
    lines
}

fn npc_detail_lines(campaign: &CampaignResult, npc: &Npc) -> Vec<Line<'static>> {
    let mut title = vec![Span::styled(npc.name.clone(), theme::title())];
    if npc.is_bbeg {
        title.push(Span::styled(
            " [BBEG]",
            Style::default().fg(theme::BBEG).add_modifier(Modifier::BOLD),
        ));
    }

    let status = if npc.alive { "Alive" } else { "Deceased" };
    let status_color = if npc.alive { theme::SUCCESS } else { theme::ERROR };

    let mut lines = vec![
        Line::from(title),
        Line::raw(""),
        labelled("Role", Span::styled(npc.role.clone(), Style::default().fg(theme::TEXT))),
        labelled("Status", Span::styled(status, Style::default().fg(status_color))),
    ];

    if let Some(n) = npc.first_appears_in {
        lines.push(labelled(
            "First appears",
            Span::styled(format!("Session {n}"), Style::default().fg(theme::TEXT)),
        ));
    }
    if let Some(notes) = npc.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("Notes", theme::heading())));
        lines.push(Line::from(Span::styled(notes.to_string(), Style::default().fg(theme::TEXT))));
    }

    let appearances: Vec<&Session> = campaign
        .sessions
        .iter()
        .filter(|s| s.npcs.iter().any(|id| *id == npc.id))
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Appears in", theme::heading())));
    if appearances.is_empty() {
        lines.push(Line::from(Span::styled("  (no sessions)", theme::dim())));
    }
    for session in appearances {
        lines.push(Line::from(vec![
            Span::styled("  • ", theme::muted()),
            Span::styled(session_label(session), Style::default().fg(theme::TEXT)),
        ]));
    }
    lines
}

fn labelled(label: &str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<15}", format!("{label}:")), theme::muted()),
        value,
    ])
}

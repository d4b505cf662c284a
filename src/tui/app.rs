use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::core::campaign::{CampaignCommand, CampaignError, CampaignOperation, CompletedRequest};

use super::events::{Action, AppEvent, Focus, InputResult, Notification, NotificationLevel};
use super::layout::AppLayout;
use super::services::Services;
use super::theme;
use super::views::campaign_form::CampaignFormState;
use super::views::campaign_list::CampaignListState;
use super::views::campaign_viewer::CampaignViewerState;
use super::widgets::progress;

const MAX_NOTIFICATIONS: usize = 3;
const NOTIFICATION_TTL: u32 = 100;

/// Central application state (Elm architecture).
pub struct AppState {
    pub running: bool,
    /// Currently focused top-level view.
    pub focus: Focus,
    pub campaigns: CampaignListState,
    pub form: CampaignFormState,
    pub viewer: CampaignViewerState,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    notification_counter: u64,
    pub show_help: bool,
    /// Monotonic tick counter, drives spinners.
    tick: u64,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    #[allow(dead_code)]
    event_tx: mpsc::UnboundedSender<AppEvent>,
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        services: Services,
    ) -> Self {
        let mut campaigns = CampaignListState::new();
        campaigns.sync_selection(&services.controller);

        let mut form = CampaignFormState::new();
        if let Some(input) = services.controller.last_input() {
            form.prefill(input);
        }

        let focus = if services.controller.active().is_some() {
            Focus::Viewer
        } else if services.controller.campaigns().is_empty() {
            Focus::Create
        } else {
            Focus::Campaigns
        };

        Self {
            running: true,
            focus,
            campaigns,
            form,
            viewer: CampaignViewerState::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            tick: 0,
            event_rx,
            event_tx,
            services,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        if self.services.controller.is_busy() {
            log::info!("Quitting with a request still in flight; its result is discarded");
        }
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 1: Help modal
                if self.show_help {
                    if let Some(action) = self.map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 2: Focused view (including its own modals)
                match self.dispatch_view_input(&crossterm_event) {
                    InputResult::Consumed => return,
                    InputResult::Action(action) => {
                        self.handle_action(action);
                        return;
                    }
                    InputResult::Ignored => {}
                }

                // Priority 3: Global keybindings
                if let Some(action) = self.map_input_to_action(crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::RequestFinished(completed) => self.on_request_finished(completed),
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    fn dispatch_view_input(&mut self, event: &Event) -> InputResult {
        let controller = &self.services.controller;
        match self.focus {
            Focus::Campaigns => self.campaigns.handle_input(event, controller),
            Focus::Create => self.form.handle_input(event, controller),
            Focus::Viewer => self.viewer.handle_input(event, controller),
        }
    }

    fn map_help_input(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            _ => None,
        }
    }

    fn map_input_to_action(&self, event: Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match (modifiers, code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, _) => match code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                KeyCode::Tab => Some(Action::TabNext),
                KeyCode::BackTab => Some(Action::TabPrev),
                KeyCode::Char('1') => Some(Action::FocusCampaigns),
                KeyCode::Char('2') => Some(Action::FocusCreate),
                KeyCode::Char('3') => Some(Action::FocusViewer),
                _ => None,
            },
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusCampaigns => self.set_focus(Focus::Campaigns),
            Action::FocusCreate => self.set_focus(Focus::Create),
            Action::FocusViewer => self.set_focus(Focus::Viewer),
            Action::TabNext => self.set_focus(self.focus.next()),
            Action::TabPrev => self.set_focus(self.focus.prev()),
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
            Action::SelectCampaign(id) => match self.services.controller.select(&id) {
                Ok(()) => {
                    self.viewer.reset();
                    self.campaigns.sync_selection(&self.services.controller);
                    self.set_focus(Focus::Viewer);
                }
                Err(e) => self.notify_error(&e),
            },
            Action::DeleteCampaign(id) => self.delete_campaign(&id),
            Action::UpdateTitleSummary { title, summary } => {
                match self.services.controller.update_title_summary(&title, &summary) {
                    Ok(()) => self.push_notification(
                        "Title and summary saved".to_string(),
                        NotificationLevel::Success,
                    ),
                    Err(e) => self.notify_error(&e),
                }
            }
            Action::Export(filename) => {
                match self
                    .services
                    .controller
                    .export_selected(&self.services.export_dir, &filename)
                {
                    Ok(path) => {
                        log::info!("Exported campaign to {}", path.display());
                        self.push_notification(
                            format!("Exported to {}", path.display()),
                            NotificationLevel::Success,
                        );
                    }
                    Err(e) => self.notify_error(&e),
                }
            }
            Action::Dispatch(command) => self.dispatch(command),
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        if self.focus == focus {
            return;
        }
        self.focus = focus;
        match focus {
            Focus::Campaigns => self.campaigns.sync_selection(&self.services.controller),
            Focus::Viewer => self.viewer.clamp(self.services.controller.active()),
            Focus::Create => {}
        }
    }

    // ── Campaign operations ─────────────────────────────────────────────

    fn delete_campaign(&mut self, id: &str) {
        if self.services.controller.is_busy() {
            self.push_notification(
                "Wait for the current request to finish".to_string(),
                NotificationLevel::Warning,
            );
            return;
        }
        let result = self
            .services
            .controller
            .select(id)
            .and_then(|()| self.services.controller.delete_selected());
        match result {
            Ok(removed) => {
                self.viewer.reset();
                self.campaigns.sync_selection(&self.services.controller);
                self.push_notification(
                    format!("Deleted \"{}\"", removed.title),
                    NotificationLevel::Success,
                );
                self.set_focus(Focus::Campaigns);
            }
            Err(e) => self.notify_error(&e),
        }
    }

    fn dispatch(&mut self, command: CampaignCommand) {
        match self.services.controller.prepare(command) {
            Ok(pending) => self.services.spawn_request(pending),
            Err(CampaignError::Busy) => self.push_notification(
                "Wait for the current request to finish".to_string(),
                NotificationLevel::Warning,
            ),
            Err(e) => self.notify_error(&e),
        }
    }

    fn on_request_finished(&mut self, completed: CompletedRequest) {
        let operation = completed.operation;
        match self.services.controller.apply(completed) {
            Ok(_) => {
                let title = self
                    .services
                    .controller
                    .active()
                    .map(|c| c.title.clone())
                    .unwrap_or_default();
                let message = match operation {
                    CampaignOperation::Generate => format!("Created \"{title}\""),
                    CampaignOperation::EditNpc => "NPC updated".to_string(),
                    CampaignOperation::EditSession => "Session updated".to_string(),
                    CampaignOperation::AddSession => "Session added".to_string(),
                    CampaignOperation::AddNpc => "NPC added".to_string(),
                };
                if operation == CampaignOperation::Generate {
                    self.viewer.reset();
                    self.campaigns.sync_selection(&self.services.controller);
                    self.set_focus(Focus::Viewer);
                } else {
                    self.viewer.clamp(self.services.controller.active());
                }
                self.push_notification(message, NotificationLevel::Success);
            }
            Err(e) => self.notify_error(&e),
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        self.notifications.push(Notification {
            id: self.notification_counter,
            message,
            level,
            ttl_ticks: NOTIFICATION_TTL,
        });

        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    fn notify_error(&mut self, error: &CampaignError) {
        log::warn!("{error}");
        let level = match error {
            CampaignError::Validation(_) | CampaignError::Busy => NotificationLevel::Warning,
            _ => NotificationLevel::Error,
        };
        self.push_notification(error.user_message(), level);
    }

    fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area);

        if let Some(tabs) = layout.tabs {
            self.render_tabs(frame, tabs);
        }
        self.render_content(frame, layout.main);
        self.render_status_bar(frame, layout.status);

        self.render_notifications(frame, area);
        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for (i, focus) in Focus::ALL.iter().enumerate() {
            let style = if *focus == self.focus {
                theme::highlight().add_modifier(Modifier::UNDERLINED)
            } else {
                theme::muted()
            };
            spans.push(Span::styled(format!("{} ", i + 1), theme::key_hint()));
            spans.push(Span::styled(focus.label(), style));
            spans.push(Span::raw("   "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        let controller = &self.services.controller;
        match self.focus {
            Focus::Campaigns => self.campaigns.render(frame, area, controller),
            Focus::Create => self.form.render(frame, area, controller, self.tick),
            Focus::Viewer => self.viewer.render(frame, area, controller, self.tick),
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let controller = &self.services.controller;
        let busy = match controller.busy_operation() {
            Some(op) => Span::styled(
                format!(" {} {} ", progress::spinner_frame(self.tick), progress::busy_label(op)),
                theme::busy_badge(),
            ),
            None => Span::styled("ready", Style::default().fg(theme::TEXT_MUTED)),
        };

        let status = Line::from(vec![
            Span::styled(" CAMPAIGN FORGE ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            busy,
            Span::raw(" │ "),
            Span::styled(self.services.provider_label.clone(), theme::muted()),
            Span::raw(" │ "),
            Span::styled(format!("{} saved", controller.campaigns().len()), theme::muted()),
            Span::raw(" │ "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":nav "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 60.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let notification_area = Rect::new(x, 1, max_width, height.min(area.height));

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).bold()),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = [
            ("Global:", ""),
            ("q", "Quit application"),
            ("?", "Toggle this help"),
            ("Tab / Shift+Tab", "Next / previous view"),
            ("1-3", "Jump to view by number"),
            ("Ctrl+C", "Force quit"),
            ("", ""),
            ("Campaigns:", ""),
            ("j/k", "Move selection"),
            ("Enter", "Open campaign"),
            ("n", "New campaign"),
            ("d", "Delete campaign"),
            ("", ""),
            ("Create:", ""),
            ("Tab / ↑↓", "Next / previous field"),
            ("←→ / letter", "Pick genre"),
            ("+ / -", "Adjust length"),
            ("Ctrl+N / Ctrl+D", "Add / remove story beat"),
            ("Ctrl+S", "Generate campaign"),
            ("Esc", "Back to campaigns"),
            ("", ""),
            ("Viewer:", ""),
            ("h/l", "Sessions / NPCs pane"),
            ("j/k", "Move selection"),
            ("e / Enter", "AI edit of selected session or NPC"),
            ("s", "AI insert session next to selection"),
            ("a", "AI add NPC"),
            ("t", "Edit title and summary"),
            ("x", "Export as text"),
            ("D", "Delete campaign"),
            ("PgUp/PgDn", "Scroll details"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                " Keybindings",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<22}", key),
                        Style::default().fg(theme::PRIMARY_LIGHT).bold(),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
            Span::raw(" or "),
            Span::styled("Esc", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::CampaignInput;
    use crate::tests::common::fixtures::{
        controller_with_replies, sample_campaign, seeded_controller, GENERATED_CAMPAIGN_JSON,
    };

    fn app(controller: crate::core::campaign::CampaignController) -> AppState {
        let (tx, rx) = mpsc::unbounded_channel();
        let services = Services::new(
            controller,
            std::env::temp_dir(),
            "mock/model".to_string(),
            tx.clone(),
        );
        AppState::new(rx, tx, services)
    }

    fn press(state: &mut AppState, code: KeyCode) {
        state.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
            code,
            KeyModifiers::NONE,
        ))));
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.x + centered.width <= area.width);
        assert!(centered.y + centered.height <= area.height);
    }

    #[test]
    fn test_initial_focus_follows_state() {
        assert_eq!(app(controller_with_replies(vec![])).focus, Focus::Create);
        assert_eq!(app(seeded_controller(vec![], false)).focus, Focus::Campaigns);
        assert_eq!(app(seeded_controller(vec![], true)).focus, Focus::Viewer);
    }

    #[test]
    fn test_notifications_dedup_and_cap() {
        let mut state = app(controller_with_replies(vec![]));
        state.push_notification("a".into(), NotificationLevel::Info);
        state.push_notification("a".into(), NotificationLevel::Info);
        assert_eq!(state.notifications.len(), 1);

        for msg in ["b", "c", "d"] {
            state.push_notification(msg.into(), NotificationLevel::Info);
        }
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(state.notifications[0].message, "b");
    }

    #[test]
    fn test_notifications_expire_on_tick() {
        let mut state = app(controller_with_replies(vec![]));
        state.push_notification("gone soon".into(), NotificationLevel::Success);
        for _ in 0..NOTIFICATION_TTL {
            state.on_tick();
        }
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_global_keys() {
        let mut state = app(seeded_controller(vec![], false));
        press(&mut state, KeyCode::Char('?'));
        assert!(state.show_help);
        press(&mut state, KeyCode::Esc);
        assert!(!state.show_help);

        press(&mut state, KeyCode::Char('3'));
        assert_eq!(state.focus, Focus::Viewer);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.focus, Focus::Campaigns);

        press(&mut state, KeyCode::Char('q'));
        assert!(!state.running);
    }

    #[test]
    fn test_select_then_delete_from_list() {
        let mut state = app(seeded_controller(vec![], false));
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.focus, Focus::Viewer);
        assert_eq!(
            state.services().controller.selected_id(),
            Some(sample_campaign().id.as_str())
        );

        state.handle_action(Action::DeleteCampaign(sample_campaign().id));
        assert!(state.services().controller.campaigns().is_empty());
        assert_eq!(state.focus, Focus::Campaigns);
        assert_eq!(state.notifications.last().unwrap().level, NotificationLevel::Success);
    }

    #[test]
    fn test_invalid_dispatch_notifies_without_request() {
        let mut state = app(controller_with_replies(vec![]));
        state.handle_action(Action::Dispatch(CampaignCommand::Generate(CampaignInput::new(
            "",
            3,
            vec![],
        ))));
        assert!(!state.services().controller.is_busy());
        assert_eq!(state.notifications[0].level, NotificationLevel::Warning);
    }

    #[test]
    fn test_title_summary_action() {
        let mut state = app(seeded_controller(vec![], true));
        state.handle_action(Action::UpdateTitleSummary {
            title: "Renamed".into(),
            summary: "New summary".into(),
        });
        let active = state.services().controller.active().unwrap();
        assert_eq!(active.title, "Renamed");
        assert_eq!(active.summary, "New summary");
    }

    #[tokio::test]
    async fn test_generate_round_trip_through_event_loop() {
        let mut state = app(controller_with_replies(vec![GENERATED_CAMPAIGN_JSON.to_string()]));
        state.handle_action(Action::Dispatch(CampaignCommand::Generate(CampaignInput::new(
            "Sci-Fi",
            3,
            vec!["A derelict ship".into()],
        ))));
        assert!(state.services().controller.is_busy());

        let event = state.event_rx.recv().await.unwrap();
        state.handle_event(event);

        assert!(!state.services().controller.is_busy());
        assert_eq!(state.focus, Focus::Viewer);
        let active = state.services().controller.active().unwrap();
        assert_eq!(active.sessions.len(), 3);
        assert!(state.notifications[0].message.starts_with("Created"));
    }

    #[tokio::test]
    async fn test_failed_request_leaves_campaign_untouched() {
        let mut state = app(seeded_controller(vec!["not json".to_string()], true));
        let before = state.services().controller.active().cloned();

        state.handle_action(Action::Dispatch(CampaignCommand::AddNpc {
            instruction: "a smuggler".into(),
        }));
        let event = state.event_rx.recv().await.unwrap();
        state.handle_event(event);

        assert_eq!(state.services().controller.active().cloned(), before);
        assert_eq!(state.notifications[0].level, NotificationLevel::Error);
        assert_eq!(
            state.notifications[0].message,
            "AI returned invalid JSON for new NPC."
        );
    }
}

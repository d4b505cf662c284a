//! Campaign creation form.
//!
//! Genre picker (with a free-text genre behind "Other"), session count and an
//! editable list of story beats. Validation runs on submit and then again on
//! every edit until the form is clean, with messages shown under each field.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::core::campaign::types::{InputErrors, CUSTOM_GENRE, MAX_LENGTH, MIN_LENGTH};
use crate::core::campaign::{CampaignCommand, CampaignController, CampaignInput, GENRE_OPTIONS};
use crate::tui::events::{Action, InputResult};
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;
use crate::tui::widgets::progress;

const DEFAULT_LENGTH: u32 = 5;
const LABEL_WIDTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Genre,
    CustomGenre,
    Length,
    Beat(usize),
}

pub struct CampaignFormState {
    /// Index into `GENRE_OPTIONS`; None until the user picks one.
    genre: Option<usize>,
    custom_genre: InputBuffer,
    length: InputBuffer,
    beats: Vec<InputBuffer>,
    field: FormField,
    errors: InputErrors,
}

impl Default for CampaignFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignFormState {
    pub fn new() -> Self {
        Self {
            genre: None,
            custom_genre: InputBuffer::new(),
            length: InputBuffer::with_text(DEFAULT_LENGTH.to_string()),
            beats: vec![InputBuffer::new()],
            field: FormField::Genre,
            errors: InputErrors::default(),
        }
    }

    /// Restore the form from a previously submitted input.
    pub fn prefill(&mut self, input: &CampaignInput) {
        let known = GENRE_OPTIONS
            .iter()
            .position(|g| *g == input.genre && *g != CUSTOM_GENRE);
        match known {
            Some(idx) => {
                self.genre = Some(idx);
                self.custom_genre.clear();
            }
            None if input.genre.trim().is_empty() => self.genre = None,
            None => {
                self.genre = GENRE_OPTIONS.iter().position(|g| *g == CUSTOM_GENRE);
                self.custom_genre.set_text(input.genre.clone());
            }
        }
        self.length.set_text(input.length.to_string());
        self.beats = input.beats.iter().map(|b| InputBuffer::with_text(b.clone())).collect();
        if self.beats.is_empty() {
            self.beats.push(InputBuffer::new());
        }
        self.field = FormField::Genre;
        self.errors = InputErrors::default();
    }

    pub fn field(&self) -> FormField {
        self.field
    }

    pub fn errors(&self) -> &InputErrors {
        &self.errors
    }

    fn genre_label(&self) -> Option<&'static str> {
        self.genre.and_then(|i| GENRE_OPTIONS.get(i).copied())
    }

    fn is_custom(&self) -> bool {
        self.genre_label() == Some(CUSTOM_GENRE)
    }

    /// Fields in tab order. The custom genre field only exists behind "Other".
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![FormField::Genre];
        if self.is_custom() {
            fields.push(FormField::CustomGenre);
        }
        fields.push(FormField::Length);
        fields.extend((0..self.beats.len()).map(FormField::Beat));
        fields
    }

    /// The input as currently entered. An unparsable length reads as 0.
    pub fn input(&self) -> CampaignInput {
        let genre = match self.genre_label() {
            Some(g) if g == CUSTOM_GENRE => self.custom_genre.text().to_string(),
            Some(g) => g.to_string(),
            None => String::new(),
        };
        let length = self.length.text().trim().parse().unwrap_or(0);
        let beats = self.beats.iter().map(|b| b.text().to_string()).collect();
        CampaignInput::new(genre, length, beats)
    }

    fn submit(&mut self) -> InputResult {
        let input = self.input();
        self.errors = input.validate();
        if !self.errors.is_empty() {
            log::debug!("Campaign form rejected: {:?}", self.errors.messages());
            return InputResult::Consumed;
        }
        InputResult::Action(Action::Dispatch(CampaignCommand::Generate(input)))
    }

    fn revalidate(&mut self) {
        if !self.errors.is_empty() {
            self.errors = self.input().validate();
        }
    }

    fn move_field(&mut self, forward: bool) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        let next = if forward {
            (idx + 1) % fields.len()
        } else {
            (idx + fields.len() - 1) % fields.len()
        };
        self.field = fields[next];
    }

    fn cycle_genre(&mut self, forward: bool) {
        let len = GENRE_OPTIONS.len();
        self.genre = Some(match (self.genre, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    /// Jump to the next genre starting with `c`.
    fn jump_genre(&mut self, c: char) {
        let c = c.to_ascii_lowercase();
        let start = self.genre.map(|i| i + 1).unwrap_or(0);
        let len = GENRE_OPTIONS.len();
        if let Some(idx) = (0..len)
            .map(|off| (start + off) % len)
            .find(|&i| GENRE_OPTIONS[i].to_ascii_lowercase().starts_with(c))
        {
            self.genre = Some(idx);
        }
    }

    fn adjust_length(&mut self, delta: i64) {
        let current = self.length.text().trim().parse::<i64>().unwrap_or(DEFAULT_LENGTH as i64);
        let next = (current + delta).clamp(MIN_LENGTH as i64, MAX_LENGTH as i64);
        self.length.set_text(next.to_string());
    }

    fn add_beat(&mut self) {
        let at = match self.field {
            FormField::Beat(i) => i + 1,
            _ => self.beats.len(),
        };
        self.beats.insert(at, InputBuffer::new());
        self.field = FormField::Beat(at);
    }

    fn remove_beat(&mut self) {
        let FormField::Beat(i) = self.field else {
            return;
        };
        if self.beats.len() <= 1 {
            self.beats[0].clear();
            return;
        }
        self.beats.remove(i);
        self.field = FormField::Beat(i.min(self.beats.len() - 1));
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, controller: &CampaignController) -> InputResult {
        let Event::Key(key) = event else {
            return InputResult::Ignored;
        };
        if key.kind != KeyEventKind::Press {
            return InputResult::Ignored;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return InputResult::Ignored;
        }
        if key.code == KeyCode::Esc {
            return InputResult::Action(Action::FocusCampaigns);
        }
        if controller.is_busy() {
            return InputResult::Consumed;
        }

        match (key.code, ctrl) {
            (KeyCode::Char('s'), true) | (KeyCode::Enter, true) => return self.submit(),
            (KeyCode::Char('n'), true) => {
                self.add_beat();
                return InputResult::Consumed;
            }
            (KeyCode::Char('d'), true) => {
                self.remove_beat();
                self.revalidate();
                return InputResult::Consumed;
            }
            (KeyCode::Tab, _) | (KeyCode::Down, _) | (KeyCode::Enter, false) => {
                self.move_field(true);
                return InputResult::Consumed;
            }
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                self.move_field(false);
                return InputResult::Consumed;
            }
            _ => {}
        }

        self.edit_field(key);
        self.revalidate();
        InputResult::Consumed
    }

    fn edit_field(&mut self, key: &KeyEvent) {
        match self.field {
            FormField::Genre => match key.code {
                KeyCode::Left => self.cycle_genre(false),
                KeyCode::Right | KeyCode::Char(' ') => self.cycle_genre(true),
                KeyCode::Char(c) if c.is_ascii_alphabetic() => self.jump_genre(c),
                _ => {}
            },
            FormField::CustomGenre => {
                self.custom_genre.handle_key(key);
            }
            FormField::Length => match key.code {
                KeyCode::Char('+') => self.adjust_length(1),
                KeyCode::Char('-') => self.adjust_length(-1),
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if self.length.text().len() < 3 {
                        self.length.insert_char(c);
                    }
                }
                KeyCode::Char(_) => {}
                _ => {
                    self.length.handle_key(key);
                }
            },
            FormField::Beat(i) => {
                if let Some(beat) = self.beats.get_mut(i) {
                    beat.handle_key(key);
                }
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, controller: &CampaignController, tick: u64) {
        let block = theme::block_focused("New Campaign");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = self.build_lines(controller.busy_operation().map(|op| (op, tick)), controller.error());
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn build_lines(
        &self,
        busy: Option<(crate::core::campaign::CampaignOperation, u64)>,
        request_error: Option<&str>,
    ) -> Vec<Line<'static>> {
        let mut lines = vec![Line::raw("")];

        let genre_value = match self.genre_label() {
            Some(g) => Span::styled(format!("◂ {g} ▸"), Style::default().fg(theme::TEXT)),
            None => Span::styled("◂ choose a genre ▸".to_string(), theme::dim()),
        };
        lines.push(self.field_line("Genre", FormField::Genre, vec![genre_value]));
        push_error(&mut lines, self.errors.genre.as_deref().filter(|_| !self.is_custom()));

        if self.is_custom() {
            let focused = self.field == FormField::CustomGenre;
            lines.push(self.field_line(
                "Custom genre",
                FormField::CustomGenre,
                self.custom_genre.line(focused).spans,
            ));
            push_error(&mut lines, self.errors.genre.as_deref());
        }

        let mut length_spans = self.length.line(self.field == FormField::Length).spans;
        length_spans.push(Span::styled(
            format!("  sessions ({MIN_LENGTH}-{MAX_LENGTH}, +/- to adjust)"),
            theme::dim(),
        ));
        lines.push(self.field_line("Length", FormField::Length, length_spans));
        push_error(&mut lines, self.errors.length.as_deref());

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("  Story beats", theme::heading())));
        for (i, beat) in self.beats.iter().enumerate() {
            let field = FormField::Beat(i);
            let focused = self.field == field;
            let cursor = if focused { "▸ " } else { "  " };
            let mut spans = vec![
                Span::styled(format!("  {cursor}"), theme::highlight()),
                Span::styled(format!("{:>2}. ", i + 1), theme::muted()),
            ];
            spans.extend(beat.line(focused).spans);
            lines.push(Line::from(spans));
        }
        push_error(&mut lines, self.errors.beats.as_deref());

        lines.push(Line::raw(""));
        if let Some((operation, tick)) = busy {
            lines.push(progress::progress_line(operation, tick));
        } else if let Some(err) = request_error {
            lines.push(Line::from(Span::styled(
                format!("  ✗ {err}"),
                Style::default().fg(theme::ERROR),
            )));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Ctrl+S:generate  Tab/↑↓:field  ←→:genre  Ctrl+N:add beat  Ctrl+D:remove beat  Esc:back",
            theme::key_hint(),
        )));
        lines
    }

    fn field_line(&self, label: &str, field: FormField, value: Vec<Span<'static>>) -> Line<'static> {
        let focused = self.field == field;
        let cursor = if focused { "▸ " } else { "  " };
        let label_style = if focused {
            theme::highlight()
        } else {
            theme::muted().add_modifier(Modifier::BOLD)
        };
        let mut spans = vec![
            Span::styled(format!("  {cursor}"), theme::highlight()),
            Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH), label_style),
        ];
        spans.extend(value);
        Line::from(spans)
    }
}

fn push_error(lines: &mut Vec<Line<'static>>, message: Option<&str>) {
    if let Some(msg) = message {
        lines.push(Line::from(Span::styled(
            format!("    {:<width$}✗ {msg}", "", width = LABEL_WIDTH),
            theme::field_error(),
        )));
    }
}

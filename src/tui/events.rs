use crate::core::campaign::{CampaignCommand, CompletedRequest};

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Periodic tick for spinners, notification TTLs, etc.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A model-backed campaign request finished in the background.
    RequestFinished(CompletedRequest),
    /// A resolved action to execute.
    Action(Action),
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// High-level actions dispatched by views or the global key map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusCampaigns,
    FocusCreate,
    FocusViewer,
    TabNext,
    TabPrev,

    // Modals
    ShowHelp,
    CloseHelp,

    // Campaign state
    SelectCampaign(String),
    DeleteCampaign(String),
    UpdateTitleSummary { title: String, summary: String },
    Export(String),
    Dispatch(CampaignCommand),

    // Application
    Quit,
}

/// What a view did with an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Not handled; fall through to global bindings.
    Ignored,
    /// Handled inside the view.
    Consumed,
    /// Handled, and the app should perform this action.
    Action(Action),
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Campaigns,
    Create,
    Viewer,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::Campaigns, Focus::Create, Focus::Viewer];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Campaigns => "Campaigns",
            Focus::Create => "Create",
            Focus::Viewer => "Viewer",
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }

    pub fn to_action(self) -> Action {
        match self {
            Focus::Campaigns => Action::FocusCampaigns,
            Focus::Create => Action::FocusCreate,
            Focus::Viewer => Action::FocusViewer,
        }
    }
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

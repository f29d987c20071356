use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use subspace_core::{
    ActivityRecord, ApiClient, ApiError, AutomationStatus, CommandAck, Config, Dashboard,
    InputField, PrimaryAction, Ticket,
};
use tokio::sync::mpsc;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Result of a backend request, delivered back to the event loop.
#[derive(Debug)]
pub enum ApiEvent {
    Status {
        ticket: Ticket,
        result: Result<AutomationStatus, ApiError>,
    },
    Activities {
        ticket: Ticket,
        result: Result<Vec<ActivityRecord>, ApiError>,
    },
    Started(Result<CommandAck, ApiError>),
    Stopped(Result<CommandAck, ApiError>),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: InputField,
    pub dashboard: Dashboard,
    pub config: Config,

    // View state
    pub dark_mode: bool,
    pub log_scroll: u16,
    pub activity_state: TableState,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub logs_area: Option<Rect>,
    pub table_area: Option<Rect>,

    client: ApiClient,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, client: ApiClient, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: InputField::Query,
            dashboard: Dashboard::new(),
            dark_mode: config.dark_mode,
            config,

            log_scroll: 0,
            activity_state: TableState::default(),
            animation_frame: 0,

            logs_area: None,
            table_area: None,

            client,
            events,
        }
    }

    pub fn api_url(&self) -> &str {
        self.client.base_url()
    }

    // Polling

    pub fn poll(&mut self, force: bool) {
        self.poll_status(force);
        self.poll_data(force);
    }

    pub fn poll_status(&mut self, force: bool) {
        let Some(ticket) = self.dashboard.begin_status_poll(force) else {
            tracing::debug!(event = "ui.app.status_poll_skipped");
            return;
        };
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.status().await;
            let _ = tx.send(AppEvent::Api(ApiEvent::Status { ticket, result }));
        });
    }

    pub fn poll_data(&mut self, force: bool) {
        let Some(ticket) = self.dashboard.begin_data_poll(force) else {
            tracing::debug!(event = "ui.app.data_poll_skipped");
            return;
        };
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.activities().await;
            let _ = tx.send(AppEvent::Api(ApiEvent::Activities { ticket, result }));
        });
    }

    // Commands

    pub fn trigger_primary(&mut self) {
        match self.dashboard.primary_action() {
            PrimaryAction::Start => self.start_automation(),
            PrimaryAction::Stop => self.stop_automation(),
        }
    }

    pub fn start_automation(&mut self) {
        let request = match self.dashboard.begin_start() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(event = "ui.app.start_rejected", reason = %e);
                return;
            }
        };

        self.input_mode = InputMode::Normal;
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.start(&request).await;
            let _ = tx.send(AppEvent::Api(ApiEvent::Started(result)));
        });
    }

    pub fn stop_automation(&mut self) {
        if let Err(e) = self.dashboard.begin_stop() {
            tracing::debug!(event = "ui.app.stop_rejected", reason = %e);
            return;
        }

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.stop().await;
            let _ = tx.send(AppEvent::Api(ApiEvent::Stopped(result)));
        });
    }

    pub fn handle_api(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Status { ticket, result } => {
                self.dashboard.apply_status(ticket, result);
                self.clamp_log_scroll();
                if self.input_mode == InputMode::Editing && self.dashboard.input_mut(self.focus).is_none() {
                    self.input_mode = InputMode::Normal;
                }
            }
            ApiEvent::Activities { ticket, result } => {
                self.dashboard.apply_activities(ticket, result);
                self.clamp_activity_selection();
            }
            ApiEvent::Started(result) => {
                if self.dashboard.finish_start(result) {
                    self.poll_status(true);
                }
            }
            ApiEvent::Stopped(result) => {
                if self.dashboard.finish_stop(result) {
                    self.poll_status(true);
                }
            }
        }
    }

    // Form editing

    /// Switches to editing `field`; returns false if that input is disabled.
    pub fn begin_editing(&mut self, field: InputField) -> bool {
        if self.dashboard.input_mut(field).is_none() {
            return false;
        }
        self.focus = field;
        self.input_mode = InputMode::Editing;
        true
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.dashboard.input_mut(self.focus) {
            input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.dashboard.input_mut(self.focus) {
            input.pop();
        }
    }

    /// Moves focus to the next enabled input, wrapping around.
    pub fn next_field(&mut self) {
        let order = [InputField::Query, InputField::Email, InputField::Password];
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        for step in 1..=order.len() {
            let candidate = order[(current + step) % order.len()];
            if self.dashboard.input_mut(candidate).is_some() {
                self.focus = candidate;
                return;
            }
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn toggle_credentials(&mut self) {
        self.dashboard.toggle_credentials();
        if self.dashboard.input_mut(self.focus).is_none() {
            self.focus = InputField::Query;
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    // Scrolling and selection

    pub fn scroll_logs_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_add(1).min(self.max_log_scroll());
    }

    pub fn scroll_logs_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    fn clamp_log_scroll(&mut self) {
        self.log_scroll = self.log_scroll.min(self.max_log_scroll());
    }

    fn max_log_scroll(&self) -> u16 {
        let last = self.dashboard.status().logs.len().saturating_sub(1);
        u16::try_from(last).unwrap_or(u16::MAX)
    }

    pub fn select_next_activity(&mut self) {
        let len = self.dashboard.activities().len();
        if len > 0 {
            let i = self.activity_state.selected().map(|i| i + 1).unwrap_or(0);
            self.activity_state.select(Some(i.min(len - 1)));
        }
    }

    pub fn select_prev_activity(&mut self) {
        if let Some(i) = self.activity_state.selected() {
            self.activity_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn select_last_activity(&mut self) {
        let len = self.dashboard.activities().len();
        if len > 0 {
            self.activity_state.select(Some(len - 1));
        }
    }

    pub fn select_first_activity(&mut self) {
        if !self.dashboard.activities().is_empty() {
            self.activity_state.select(Some(0));
        }
    }

    fn clamp_activity_selection(&mut self) {
        let len = self.dashboard.activities().len();
        match self.activity_state.selected() {
            Some(_) if len == 0 => self.activity_state.select(None),
            Some(i) if i >= len => self.activity_state.select(Some(len - 1)),
            _ => {}
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.dashboard.pending_command().is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }
    }
}

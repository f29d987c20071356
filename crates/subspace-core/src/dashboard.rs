//! UI-agnostic dashboard state
//!
//! `Dashboard` mirrors the backend (status and activity feed), holds the
//! user's form input, and decides which requests may be issued. It performs
//! no I/O itself: front ends ask it for a ticket or a request body, run the
//! HTTP call however they like, and hand the result back.

use crate::api::CommandAck;
use crate::error::{ApiError, CommandError};
use crate::models::{
    order_logs, ActivityRecord, ActivitySummary, AutomationStatus, Credentials, LogLine, LogOrder,
    StartRequest,
};

pub const START_FAILED: &str = "Failed to start automation. Check backend.";
pub const STOP_FAILED: &str = "Failed to stop.";

/// Identifies one issued poll. Later tickets always compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    /// A newer response was already applied; this one was dropped.
    Stale,
    Failed,
}

#[derive(Debug, Default)]
struct PollTracker {
    issued: u64,
    applied: u64,
    in_flight: usize,
}

impl PollTracker {
    fn begin(&mut self, force: bool) -> Option<Ticket> {
        if !force && self.in_flight > 0 {
            return None;
        }
        self.issued += 1;
        self.in_flight += 1;
        Some(Ticket(self.issued))
    }

    fn settle(&mut self, ticket: Ticket, succeeded: bool) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !succeeded || ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Query,
    Email,
    Password,
}

impl InputField {
    pub fn label(&self) -> &'static str {
        match self {
            InputField::Query => "Search",
            InputField::Email => "Email",
            InputField::Password => "Password",
        }
    }
}

/// The single button of the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Start,
    Stop,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Start => "Start Automation",
            PrimaryAction::Stop => "Stop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Warning,
    Error,
}

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    status: AutomationStatus,
    activities: Vec<ActivityRecord>,

    query: String,
    credentials: Credentials,
    show_credentials: bool,

    notice: Option<Notice>,
    pending: Option<PendingCommand>,

    status_polls: PollTracker,
    data_polls: PollTracker,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    // Mirrored backend state

    pub fn status(&self) -> &AutomationStatus {
        &self.status
    }

    pub fn activities(&self) -> &[ActivityRecord] {
        &self.activities
    }

    pub fn is_running(&self) -> bool {
        self.status.running
    }

    pub fn summary(&self) -> ActivitySummary {
        ActivitySummary::from_records(&self.activities)
    }

    pub fn log_lines(&self, order: LogOrder) -> Vec<LogLine> {
        order_logs(&self.status.logs, order)
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.status.running {
            PrimaryAction::Stop
        } else {
            PrimaryAction::Start
        }
    }

    /// The search box is read-only while automation runs.
    pub fn input_locked(&self) -> bool {
        self.status.running
    }

    // Polling

    /// Returns `None` when a timer-driven poll would overlap one still in flight.
    pub fn begin_status_poll(&mut self, force: bool) -> Option<Ticket> {
        self.status_polls.begin(force)
    }

    pub fn apply_status(
        &mut self,
        ticket: Ticket,
        result: Result<AutomationStatus, ApiError>,
    ) -> PollOutcome {
        match result {
            Ok(status) => {
                if self.status_polls.settle(ticket, true) {
                    self.status = status;
                    PollOutcome::Applied
                } else {
                    tracing::debug!(event = "core.dashboard.status_stale", ticket = ticket.0);
                    PollOutcome::Stale
                }
            }
            Err(e) => {
                self.status_polls.settle(ticket, false);
                tracing::warn!(event = "core.dashboard.status_poll_failed", error = %e);
                PollOutcome::Failed
            }
        }
    }

    pub fn begin_data_poll(&mut self, force: bool) -> Option<Ticket> {
        self.data_polls.begin(force)
    }

    pub fn apply_activities(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ActivityRecord>, ApiError>,
    ) -> PollOutcome {
        match result {
            Ok(activities) => {
                if self.data_polls.settle(ticket, true) {
                    self.activities = activities;
                    PollOutcome::Applied
                } else {
                    tracing::debug!(event = "core.dashboard.data_stale", ticket = ticket.0);
                    PollOutcome::Stale
                }
            }
            Err(e) => {
                self.data_polls.settle(ticket, false);
                tracing::warn!(event = "core.dashboard.data_poll_failed", error = %e);
                PollOutcome::Failed
            }
        }
    }

    // Commands

    pub fn pending_command(&self) -> Option<PendingCommand> {
        self.pending
    }

    /// Validates the form and builds the start request.
    ///
    /// An empty query raises a warning notice and no request is produced.
    pub fn begin_start(&mut self) -> Result<StartRequest, CommandError> {
        if self.pending.is_some() {
            return Err(CommandError::CommandPending);
        }
        if self.status.running {
            return Err(CommandError::AlreadyRunning);
        }

        let query = self.query.trim();
        if query.is_empty() {
            self.notice = Some(Notice::warning(CommandError::EmptyQuery.to_string()));
            return Err(CommandError::EmptyQuery);
        }

        // Hidden credentials mean "use the backend's defaults".
        let request = if self.show_credentials {
            StartRequest::new(query, &self.credentials)
        } else {
            StartRequest::new(query, &Credentials::default())
        };

        self.pending = Some(PendingCommand::Start);
        self.notice = None;
        tracing::info!(event = "core.dashboard.start_requested", query = %request.query);
        Ok(request)
    }

    /// Returns true when the caller should re-poll status.
    pub fn finish_start(&mut self, result: Result<CommandAck, ApiError>) -> bool {
        self.pending = None;
        match result {
            Ok(ack) => {
                tracing::info!(
                    event = "core.dashboard.start_accepted",
                    ack = ack.message.as_deref().unwrap_or("")
                );
                true
            }
            Err(e) => {
                tracing::error!(event = "core.dashboard.start_failed", error = %e);
                self.notice = Some(Notice::error(START_FAILED));
                false
            }
        }
    }

    pub fn begin_stop(&mut self) -> Result<(), CommandError> {
        if self.pending.is_some() {
            return Err(CommandError::CommandPending);
        }
        if !self.status.running {
            return Err(CommandError::NotRunning);
        }
        self.pending = Some(PendingCommand::Stop);
        self.notice = None;
        tracing::info!(event = "core.dashboard.stop_requested");
        Ok(())
    }

    /// Returns true when the caller should re-poll status.
    pub fn finish_stop(&mut self, result: Result<CommandAck, ApiError>) -> bool {
        self.pending = None;
        match result {
            Ok(ack) => {
                tracing::info!(
                    event = "core.dashboard.stop_accepted",
                    ack = ack.message.as_deref().unwrap_or("")
                );
                true
            }
            Err(e) => {
                tracing::error!(event = "core.dashboard.stop_failed", error = %e);
                self.notice = Some(Notice::error(STOP_FAILED));
                false
            }
        }
    }

    // Form input

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn show_credentials(&self) -> bool {
        self.show_credentials
    }

    pub fn toggle_credentials(&mut self) {
        self.show_credentials = !self.show_credentials;
    }

    /// Mutable access to an input, or `None` when that input is disabled.
    pub fn input_mut(&mut self, field: InputField) -> Option<&mut String> {
        match field {
            InputField::Query if self.input_locked() => None,
            InputField::Query => Some(&mut self.query),
            InputField::Email | InputField::Password if !self.show_credentials => None,
            InputField::Email => Some(&mut self.credentials.email),
            InputField::Password => Some(&mut self.credentials.password),
        }
    }

    // Notices

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::Action;

    fn server_error(endpoint: &'static str) -> ApiError {
        ApiError::Status {
            endpoint,
            status: 500,
        }
    }

    fn status(running: bool, logs: &[&str]) -> AutomationStatus {
        AutomationStatus {
            running,
            logs: logs.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn record(id: u64, action: Action) -> ActivityRecord {
        ActivityRecord {
            id,
            action,
            metadata: "Jane".into(),
            profile_url: "https://example.com/in/jane".into(),
            timestamp: Utc::now(),
        }
    }

    fn poll_status(dashboard: &mut Dashboard, result: Result<AutomationStatus, ApiError>) {
        let ticket = dashboard.begin_status_poll(true).unwrap();
        dashboard.apply_status(ticket, result);
    }

    #[test]
    fn test_initial_state_is_idle() {
        let dashboard = Dashboard::new();
        assert!(!dashboard.is_running());
        assert!(!dashboard.input_locked());
        assert_eq!(dashboard.primary_action(), PrimaryAction::Start);
        assert!(dashboard.log_lines(LogOrder::LatestFirst).is_empty());
        assert_eq!(dashboard.summary(), ActivitySummary::default());
    }

    #[test]
    fn test_status_replaced_wholesale() {
        let mut dashboard = Dashboard::new();
        poll_status(&mut dashboard, Ok(status(true, &["[10:00:00] a", "[10:00:01] b"])));
        poll_status(&mut dashboard, Ok(status(false, &["[10:00:02] c"])));
        assert_eq!(dashboard.status(), &status(false, &["[10:00:02] c"]));
    }

    #[test]
    fn test_failed_status_poll_keeps_previous() {
        let mut dashboard = Dashboard::new();
        poll_status(&mut dashboard, Ok(status(true, &["[10:00:00] Logging in..."])));

        let ticket = dashboard.begin_status_poll(false).unwrap();
        let outcome = dashboard.apply_status(ticket, Err(server_error("/api/status")));

        assert_eq!(outcome, PollOutcome::Failed);
        assert!(dashboard.is_running());
        assert_eq!(dashboard.status().logs, vec!["[10:00:00] Logging in..."]);
        assert!(dashboard.notice().is_none());
    }

    #[test]
    fn test_failed_data_poll_keeps_previous() {
        let mut dashboard = Dashboard::new();
        let ticket = dashboard.begin_data_poll(false).unwrap();
        dashboard.apply_activities(ticket, Ok(vec![record(1, Action::Connect)]));

        let ticket = dashboard.begin_data_poll(false).unwrap();
        let outcome = dashboard.apply_activities(ticket, Err(server_error("/api/data")));

        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(dashboard.activities().len(), 1);
        assert_eq!(dashboard.summary().requests_sent, 1);
    }

    #[test]
    fn test_tick_skipped_while_poll_in_flight() {
        let mut dashboard = Dashboard::new();
        let first = dashboard.begin_status_poll(false);
        assert!(first.is_some());
        assert!(dashboard.begin_status_poll(false).is_none());
        // Data polls are tracked separately.
        assert!(dashboard.begin_data_poll(false).is_some());

        dashboard.apply_status(first.unwrap(), Ok(status(false, &[])));
        assert!(dashboard.begin_status_poll(false).is_some());
    }

    #[test]
    fn test_forced_poll_overlaps_and_failure_releases_slot() {
        let mut dashboard = Dashboard::new();
        let tick = dashboard.begin_status_poll(false).unwrap();
        let forced = dashboard.begin_status_poll(true).unwrap();
        assert!(forced > tick);

        dashboard.apply_status(tick, Err(server_error("/api/status")));
        dashboard.apply_status(forced, Err(server_error("/api/status")));
        assert!(dashboard.begin_status_poll(false).is_some());
    }

    #[test]
    fn test_older_response_does_not_overwrite_newer() {
        let mut dashboard = Dashboard::new();
        let older = dashboard.begin_status_poll(false).unwrap();
        let newer = dashboard.begin_status_poll(true).unwrap();

        assert_eq!(
            dashboard.apply_status(newer, Ok(status(true, &["new"]))),
            PollOutcome::Applied
        );
        assert_eq!(
            dashboard.apply_status(older, Ok(status(false, &["old"]))),
            PollOutcome::Stale
        );
        assert!(dashboard.is_running());
        assert_eq!(dashboard.status().logs, vec!["new"]);
    }

    #[test]
    fn test_older_response_applies_when_newer_failed() {
        let mut dashboard = Dashboard::new();
        let older = dashboard.begin_data_poll(false).unwrap();
        let newer = dashboard.begin_data_poll(true).unwrap();

        dashboard.apply_activities(newer, Err(server_error("/api/data")));
        assert_eq!(
            dashboard.apply_activities(older, Ok(vec![record(1, Action::Message)])),
            PollOutcome::Applied
        );
        assert_eq!(dashboard.summary().messages_sent, 1);
    }

    #[test]
    fn test_start_with_empty_query_warns() {
        let mut dashboard = Dashboard::new();
        assert_eq!(dashboard.begin_start(), Err(CommandError::EmptyQuery));
        assert_eq!(dashboard.pending_command(), None);
        let notice = dashboard.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.message, "Please enter a job title or keyword.");

        dashboard.dismiss_notice();
        *dashboard.input_mut(InputField::Query).unwrap() = "   ".into();
        assert_eq!(dashboard.begin_start(), Err(CommandError::EmptyQuery));
    }

    #[test]
    fn test_start_builds_trimmed_request_without_hidden_credentials() {
        let mut dashboard = Dashboard::new();
        *dashboard.input_mut(InputField::Query).unwrap() = "  Recruiter ".into();

        let request = dashboard.begin_start().unwrap();
        assert_eq!(request.query, "Recruiter");
        assert_eq!(request.email, "");
        assert_eq!(request.password, "");
        assert_eq!(dashboard.pending_command(), Some(PendingCommand::Start));
    }

    #[test]
    fn test_start_sends_visible_credentials() {
        let mut dashboard = Dashboard::new();
        assert!(dashboard.input_mut(InputField::Email).is_none());

        dashboard.toggle_credentials();
        *dashboard.input_mut(InputField::Query).unwrap() = "Founder".into();
        *dashboard.input_mut(InputField::Email).unwrap() = "me@example.com".into();
        *dashboard.input_mut(InputField::Password).unwrap() = "secret".into();

        let request = dashboard.begin_start().unwrap();
        assert_eq!(request.email, "me@example.com");
        assert_eq!(request.password, "secret");
    }

    #[test]
    fn test_double_start_rejected_while_pending() {
        let mut dashboard = Dashboard::new();
        *dashboard.input_mut(InputField::Query).unwrap() = "Recruiter".into();
        assert!(dashboard.begin_start().is_ok());
        assert_eq!(dashboard.begin_start(), Err(CommandError::CommandPending));

        assert!(dashboard.finish_start(Ok(CommandAck::default())));
        assert_eq!(dashboard.pending_command(), None);
    }

    #[test]
    fn test_start_then_running_poll_locks_input() {
        let mut dashboard = Dashboard::new();
        *dashboard.input_mut(InputField::Query).unwrap() = "Recruiter".into();
        dashboard.begin_start().unwrap();
        assert!(dashboard.finish_start(Ok(CommandAck::default())));

        poll_status(&mut dashboard, Ok(status(true, &[])));

        assert!(dashboard.input_locked());
        assert!(dashboard.input_mut(InputField::Query).is_none());
        assert_eq!(dashboard.primary_action(), PrimaryAction::Stop);
        assert_eq!(dashboard.query(), "Recruiter");
        assert_eq!(dashboard.begin_start(), Err(CommandError::AlreadyRunning));
    }

    #[test]
    fn test_start_failure_surfaces_error_and_keeps_state() {
        let mut dashboard = Dashboard::new();
        *dashboard.input_mut(InputField::Query).unwrap() = "Recruiter".into();
        dashboard.begin_start().unwrap();

        assert!(!dashboard.finish_start(Err(server_error("/api/start"))));
        assert!(!dashboard.is_running());
        assert_eq!(dashboard.pending_command(), None);
        assert_eq!(dashboard.notice(), Some(&Notice::error(START_FAILED)));
    }

    #[test]
    fn test_stop_then_idle_poll_unlocks_input() {
        let mut dashboard = Dashboard::new();
        poll_status(&mut dashboard, Ok(status(true, &[])));

        dashboard.begin_stop().unwrap();
        assert_eq!(dashboard.begin_stop(), Err(CommandError::CommandPending));
        assert!(dashboard.finish_stop(Ok(CommandAck::default())));

        poll_status(&mut dashboard, Ok(status(false, &[])));

        assert!(!dashboard.input_locked());
        assert!(dashboard.input_mut(InputField::Query).is_some());
        assert_eq!(dashboard.primary_action(), PrimaryAction::Start);
    }

    #[test]
    fn test_stop_when_idle_rejected() {
        let mut dashboard = Dashboard::new();
        assert_eq!(dashboard.begin_stop(), Err(CommandError::NotRunning));
    }

    #[test]
    fn test_stop_failure_surfaces_error() {
        let mut dashboard = Dashboard::new();
        poll_status(&mut dashboard, Ok(status(true, &[])));
        dashboard.begin_stop().unwrap();

        assert!(!dashboard.finish_stop(Err(server_error("/api/stop"))));
        assert!(dashboard.is_running());
        assert_eq!(dashboard.notice().unwrap().message, STOP_FAILED);
    }

    #[test]
    fn test_log_lines_every_entry_once() {
        let mut dashboard = Dashboard::new();
        let logs = ["Ready to start.", "[10:00:00] Initializing browser...", "[10:00:05] Logging in..."];
        poll_status(&mut dashboard, Ok(status(true, &logs)));

        let latest = dashboard.log_lines(LogOrder::LatestFirst);
        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].message, "Logging in...");
        assert_eq!(latest[2].message, "Ready to start.");

        let insertion = dashboard.log_lines(LogOrder::Insertion);
        assert_eq!(insertion[0].prefix, None);
        assert_eq!(insertion[1].prefix.as_deref(), Some("[10:00:00]"));
    }
}

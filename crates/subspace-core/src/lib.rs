pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;

// Re-export main types for convenience
pub use api::{ApiClient, CommandAck};
pub use config::Config;
pub use dashboard::{
    Dashboard, InputField, Notice, NoticeKind, PendingCommand, PollOutcome, PrimaryAction, Ticket,
};
pub use error::{ApiError, CommandError};
pub use models::{
    order_logs, Action, ActivityRecord, ActivitySummary, AutomationStatus, Credentials, LogLine,
    LogOrder, StartRequest,
};

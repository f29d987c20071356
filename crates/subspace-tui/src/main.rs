use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Password, theme::ColorfulTheme};
use subspace_core::dashboard::{START_FAILED, STOP_FAILED};
use subspace_core::{
    order_logs, Action, ActivitySummary, ApiClient, ApiError, Config, Dashboard, InputField,
    LogOrder,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use logging::LogTarget;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "subspace")]
#[command(version, about = "Control and monitor the SubSpace Automator backend")]
struct Cli {
    /// Backend base URL (overrides SUBSPACE_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, global = true)]
    interval: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the live dashboard (default)
    Dashboard,
    /// Print whether the automation is running, plus its logs
    Status {
        /// Print logs oldest first
        #[arg(long)]
        oldest_first: bool,
    },
    /// Print the collected activity records
    Data {
        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Start an automation run
    Start {
        /// Job title or keyword to search for
        query: String,
        /// LinkedIn email to use instead of the backend's defaults
        #[arg(short, long)]
        email: Option<String>,
        /// Ask for a LinkedIn password interactively
        #[arg(short, long)]
        prompt_password: bool,
    },
    /// Stop the running automation
    Stop,
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);

    let target = if matches!(command, Commands::Dashboard) {
        logging::default_log_path().map(LogTarget::File)
    } else {
        Some(LogTarget::Stderr)
    };
    if let Some(target) = target {
        if let Err(e) = logging::init_logging(target) {
            eprintln!("{}: {:#}", "Logging disabled".yellow(), e);
        }
    }

    let mut config = Config::load()?;
    config.apply_api_url_override(cli.api_url);
    if let Some(interval) = cli.interval {
        config.poll_interval_ms = interval;
    }

    let client = ApiClient::new(&config.api_url, config.request_timeout())?;
    tracing::info!(event = "ui.main.started", api_url = %client.base_url());

    match command {
        Commands::Dashboard => run_dashboard(config, client).await?,
        Commands::Status { oldest_first } => {
            let order = if oldest_first {
                LogOrder::Insertion
            } else {
                config.log_order
            };
            show_status(&client, order).await?
        }
        Commands::Data { limit } => show_data(&client, limit).await?,
        Commands::Start { query, email, prompt_password } => {
            start_automation(&client, &query, email, prompt_password).await?
        }
        Commands::Stop => stop_automation(&client).await?,
        Commands::Config { save } => show_config(&config, save)?,
    }

    Ok(())
}

async fn run_dashboard(config: Config, client: ApiClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new(config.poll_interval());
    let mut app = App::new(config, client, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    drop(events);
    tui::restore()?;

    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn show_status(client: &ApiClient, order: LogOrder) -> Result<()> {
    let status = client.status().await?;

    if status.running {
        println!("{} {}", "●".green(), "RUNNING".bold().green());
    } else {
        println!("{} {}", "○".dimmed(), "IDLE".bold());
    }

    if status.logs.is_empty() {
        println!("{}", "Waiting for process...".dimmed());
        return Ok(());
    }

    println!("{}", "=".repeat(50).dimmed());
    for line in order_logs(&status.logs, order) {
        match line.prefix {
            Some(prefix) => println!("{} {}", prefix.dimmed(), line.message.green()),
            None => println!("{}", line.message.green()),
        }
    }

    Ok(())
}

async fn show_data(client: &ApiClient, limit: Option<usize>) -> Result<()> {
    let records = client.activities().await?;
    let summary = ActivitySummary::from_records(&records);

    println!(
        "{} {}   {} {}   {} {}",
        "Profiles Scraped:".bold(),
        summary.profiles_found.to_string().blue(),
        "Requests Sent:".bold(),
        summary.requests_sent.to_string().green(),
        "Messages:".bold(),
        summary.messages_sent.to_string().magenta(),
    );

    if records.is_empty() {
        println!("\n{}", "No data found yet. Start an automation to begin scraping.".dimmed());
        return Ok(());
    }

    println!("{}", "=".repeat(50).dimmed());
    let shown = limit.unwrap_or(records.len());
    for record in records.iter().take(shown) {
        let badge = match record.action {
            Action::SearchFound => record.action.badge().blue(),
            Action::Connect => record.action.badge().green(),
            Action::Message => record.action.badge().magenta(),
            Action::Other(_) => record.action.badge().normal(),
        };
        println!(
            "{}  {}  {}",
            record.local_time().dimmed(),
            badge.bold(),
            record.metadata,
        );
        println!("          {}", record.profile_url.cyan());
    }

    if shown < records.len() {
        println!("\n{} more not shown", (records.len() - shown).to_string().bold());
    }

    Ok(())
}

async fn start_automation(
    client: &ApiClient,
    query: &str,
    email: Option<String>,
    prompt_password: bool,
) -> Result<()> {
    // Refuse to start a second run, the same way the dashboard does.
    let mut dashboard = match synced_dashboard(client).await {
        Ok(dashboard) => dashboard,
        Err(e) => return command_failed(START_FAILED, e),
    };

    if let Some(input) = dashboard.input_mut(InputField::Query) {
        *input = query.to_string();
    }

    if email.is_some() || prompt_password {
        dashboard.toggle_credentials();
        if let Some(input) = dashboard.input_mut(InputField::Email) {
            *input = email.unwrap_or_default();
        }
        if prompt_password {
            let password = Password::with_theme(&ColorfulTheme::default())
                .with_prompt("LinkedIn password")
                .allow_empty_password(true)
                .interact()?;
            if let Some(input) = dashboard.input_mut(InputField::Password) {
                *input = password;
            }
        }
    }

    let request = match dashboard.begin_start() {
        Ok(request) => request,
        Err(e) => {
            println!("{}", e.to_string().yellow());
            return Err(e.into());
        }
    };

    println!("🚀 Starting automation for: {}", request.query.bold().cyan());
    let result = client.start(&request).await;
    let ack = result.as_ref().ok().and_then(|ack| ack.message.clone());

    if dashboard.finish_start(result) {
        println!("{}", ack.unwrap_or_else(|| "Automation started".to_string()).green());
        Ok(())
    } else {
        notice_error(&dashboard)
    }
}

async fn stop_automation(client: &ApiClient) -> Result<()> {
    let mut dashboard = match synced_dashboard(client).await {
        Ok(dashboard) => dashboard,
        Err(e) => return command_failed(STOP_FAILED, e),
    };

    if let Err(e) = dashboard.begin_stop() {
        println!("{}", e.to_string().yellow());
        return Ok(());
    }

    let result = client.stop().await;
    let ack = result.as_ref().ok().and_then(|ack| ack.message.clone());

    if dashboard.finish_stop(result) {
        println!("{}", ack.unwrap_or_else(|| "Automation stopped".to_string()).green());
        Ok(())
    } else {
        notice_error(&dashboard)
    }
}

/// A dashboard holding the backend's current status.
///
/// An unreachable backend is an error here; the command guards only mean
/// something against a status that was actually fetched.
async fn synced_dashboard(client: &ApiClient) -> Result<Dashboard, ApiError> {
    let mut dashboard = Dashboard::new();
    if let Some(ticket) = dashboard.begin_status_poll(true) {
        let status = client.status().await?;
        dashboard.apply_status(ticket, Ok(status));
    }
    Ok(dashboard)
}

fn command_failed(message: &str, error: ApiError) -> Result<()> {
    tracing::error!(event = "ui.main.status_check_failed", error = %error);
    println!("{}", message.red());
    Err(anyhow::Error::new(error).context(message.to_string()))
}

fn notice_error(dashboard: &Dashboard) -> Result<()> {
    let message = dashboard
        .notice()
        .map(|notice| notice.message.clone())
        .unwrap_or_default();
    println!("{}", message.red());
    Err(anyhow!(message))
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    let path = Config::get_config_path()?;

    if save {
        config.save()?;
        println!("{} {}", "Saved".green(), path.display());
    } else {
        println!("{}", path.display().to_string().dimmed());
    }

    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

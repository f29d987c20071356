use std::io::{self, Stderr};
use std::time::Duration;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::ApiEvent;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

const ANIMATION_TICK: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal size changed; the next draw picks up the new area.
    Resize,
    /// Animation frame.
    Tick,
    /// Time to refresh status and activity data.
    Poll,
    /// A backend request finished.
    Api(ApiEvent),
}

/// Merges terminal input, timers and finished requests into one queue.
///
/// Dropping the handler stops the timers and the input reader. Requests
/// already in flight run to completion but their results go nowhere.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // Spawn event reader task
        let tx_events = tx.clone();
        let reader_task = tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(evt) = reader.next().await {
                let app_event = match evt {
                    Ok(Event::Key(key)) => {
                        // Only handle key press events, not release
                        if key.kind == KeyEventKind::Press {
                            Some(AppEvent::Key(key))
                        } else {
                            None
                        }
                    }
                    Ok(Event::Mouse(mouse)) => Some(AppEvent::Mouse(mouse)),
                    Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(event = "ui.events.read_failed", error = %e);
                        None
                    }
                };

                if let Some(event) = app_event {
                    if tx_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        let tick_task = spawn_interval(tx.clone(), ANIMATION_TICK, || AppEvent::Tick);

        // First tick fires immediately, so data shows up as soon as the view opens.
        let poll_task = spawn_interval(tx.clone(), poll_interval, || AppEvent::Poll);

        Self {
            rx,
            tx,
            tasks: vec![reader_task, tick_task, poll_task],
        }
    }

    /// Sender for background tasks that report back to the event loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn spawn_interval(
    tx: mpsc::UnboundedSender<AppEvent>,
    period: Duration,
    make_event: fn() -> AppEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if tx.send(make_event()).is_err() {
                break;
            }
        }
    })
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;

    // Enable mouse capture
    execute!(io::stderr(), crossterm::event::EnableMouseCapture)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), crossterm::event::DisableMouseCapture)?;
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_interval_fires_immediately_then_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = spawn_interval(tx, Duration::from_secs(2), || AppEvent::Poll);

        assert!(matches!(rx.recv().await, Some(AppEvent::Poll)));
        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(matches!(rx.recv().await, Some(AppEvent::Poll)));

        task.abort();
    }

    #[tokio::test]
    async fn test_interval_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn_interval(tx, Duration::from_millis(5), || AppEvent::Tick);
        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("interval task should exit")
            .expect("task not cancelled");
    }
}

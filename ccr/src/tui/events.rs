use super::forms::NameCheckResult;
use ccr_core::{CcrError, CcrResult, FieldValues, FollowerIndex, RemoteCluster};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Events that drive the console
///
/// Terminal input and ticks come from [`EventHandler::next`]. Everything else is
/// sent through [`EventHandler::sender`] by spawned requests and by the form's
/// collaborators.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    /// Switch to the screen for a console path
    Navigate(String),
    NameChecked(NameCheckResult),
    SaveRequested { name: String, fields: FieldValues },
    ClearApiError,
    Saved {
        name: String,
        is_new: bool,
        result: CcrResult<()>,
    },
    FollowerIndicesLoaded(CcrResult<Vec<FollowerIndex>>),
    FormDataLoaded {
        path: String,
        result: CcrResult<FormData>,
    },
    Fatal { title: String, message: String },
}

/// What the form screen needs before it can be shown.
#[derive(Debug, Clone)]
pub struct FormData {
    pub remote_clusters: Vec<RemoteCluster>,
    pub follower_index: Option<FollowerIndex>,
}

/// Tick schedule. A tick is only due once `tick_rate` has elapsed since the
/// previous one.
#[derive(Debug)]
struct Ticker {
    last_tick: Instant,
    tick_rate: Duration,
}

impl Ticker {
    fn new(tick_rate: Duration) -> Self {
        Self {
            last_tick: Instant::now(),
            tick_rate,
        }
    }

    fn until_next(&self) -> Duration {
        self.tick_rate
            .checked_sub(self.last_tick.elapsed())
            .unwrap_or_default()
    }

    /// True once per elapsed tick period.
    fn take_due(&mut self) -> bool {
        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = Instant::now();
            true
        } else {
            false
        }
    }
}

/// Merges terminal input, ticks and internal events into one stream.
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    ticker: Ticker,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender,
            receiver,
            ticker: Ticker::new(tick_rate),
        }
    }

    /// Next event. Internal events are drained first, then terminal input is
    /// polled until the next tick is due.
    pub async fn next(&mut self) -> CcrResult<Event> {
        loop {
            if let Ok(event) = self.receiver.try_recv() {
                return Ok(event);
            }

            let timeout = self.ticker.until_next().min(Duration::from_millis(50));

            if event::poll(timeout).map_err(|e| CcrError::Internal {
                message: format!("Failed to poll events: {}", e),
            })? {
                match event::read().map_err(|e| CcrError::Internal {
                    message: format!("Failed to read event: {}", e),
                })? {
                    // Windows reports releases as well
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        return Ok(Event::Key(key))
                    }
                    _ => {}
                }
            }

            if self.ticker.take_due() {
                return Ok(Event::Tick);
            }

            // Yield so spawned requests can make progress
            tokio::task::yield_now().await;
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

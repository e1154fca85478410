//! Application state management for Next Match CLI
//!
//! This module ties the cache and the countdown together: it loads the next
//! match, counts down to it, refreshes when kickoff passes or the user asks,
//! and keeps the state the screen renders from.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::cache::{MatchCache, Storage};
use crate::countdown::{CountdownEngine, CountdownState};
use crate::data::{FetchError, MatchFetcher, MatchRecord};

/// Shown when the club has nothing scheduled
const NO_MATCH_MESSAGE: &str = "No upcoming matches found";

/// Shown when the initial load fails
const LOAD_FAILED_MESSAGE: &str = "Unable to load match information. Please try again later.";

/// Shown when a refresh fails
const REFRESH_FAILED_MESSAGE: &str = "Unable to refresh match information. Please try again later.";

/// Which request a fetch result answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Cache-first load
    Load,
    /// Forced refresh
    Refresh,
}

/// Events delivered to the app from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A new countdown value for the countdown numbered `generation`
    Tick {
        generation: u64,
        state: CountdownState,
    },
    /// The countdown numbered `generation` reached kickoff
    Finished { generation: u64 },
    /// A fetch completed
    Fetched {
        kind: FetchKind,
        result: Result<MatchRecord, FetchError>,
    },
}

/// Everything the screen needs to draw itself
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// The match being counted down to
    pub match_record: Option<MatchRecord>,
    /// Kickoff formatted in the configured zone
    pub kickoff_local: Option<String>,
    /// Latest countdown value
    pub countdown: CountdownState,
    /// A cache-first load is in flight
    pub loading: bool,
    /// A forced refresh is in flight
    pub refreshing: bool,
    /// User-facing error from the last fetch
    pub error: Option<String>,
    /// Flag to show help overlay
    pub show_help: bool,
}

/// Main application struct managing state and data
pub struct App<S, F> {
    /// State rendered by the UI
    pub display: DisplayState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    cache: Arc<MatchCache<S, F>>,
    engine: CountdownEngine,
    timezone: Tz,
    /// Number of the countdown whose events are current
    generation: u64,
    events_tx: mpsc::UnboundedSender<AppEvent>,
}

impl<S, F> App<S, F>
where
    S: Storage + 'static,
    F: MatchFetcher + 'static,
{
    /// Creates the app and the receiver its background events arrive on
    ///
    /// Feed every received event back through [`App::handle_event`].
    pub fn new(
        cache: MatchCache<S, F>,
        engine: CountdownEngine,
        timezone: Tz,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let app = Self {
            display: DisplayState::default(),
            should_quit: false,
            cache: Arc::new(cache),
            engine,
            timezone,
            generation: 0,
            events_tx,
        };
        (app, events_rx)
    }

    /// Loads the next match, using the cache when it can be trusted
    pub fn load(&mut self) {
        self.display.loading = true;
        self.display.error = None;
        self.spawn_fetch(FetchKind::Load);
    }

    /// Stops the countdown and fetches the next match, bypassing the cache
    pub fn refresh(&mut self) {
        self.display.refreshing = true;
        self.engine.cancel();
        self.spawn_fetch(FetchKind::Refresh);
    }

    /// Removes the cached match; the current countdown keeps running
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn spawn_fetch(&self, kind: FetchKind) {
        let cache = Arc::clone(&self.cache);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match kind {
                FetchKind::Load => cache.get().await,
                FetchKind::Refresh => cache.force_refresh().await,
            };
            let _ = tx.send(AppEvent::Fetched { kind, result });
        });
    }

    /// Applies an event from a background task
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick { generation, state } => {
                if generation == self.generation {
                    self.display.countdown = state;
                }
            }
            AppEvent::Finished { generation } => {
                if generation != self.generation {
                    return;
                }
                // Same fields as the zero tick, so the engine never delivers it as a Tick
                self.display.countdown = CountdownState::FINISHED;
                if !self.display.refreshing {
                    info!("match time passed, refreshing");
                    self.refresh();
                }
            }
            AppEvent::Fetched { kind, result } => self.apply_fetch(kind, result),
        }
    }

    fn apply_fetch(&mut self, kind: FetchKind, result: Result<MatchRecord, FetchError>) {
        self.display.loading = false;
        self.display.refreshing = false;

        match result {
            Ok(match_record) => {
                self.display.kickoff_local =
                    Some(format_kickoff(match_record.utc_date, self.timezone));
                self.display.error = None;
                let target = match_record.utc_date;
                self.display.match_record = Some(match_record);
                self.start_countdown(target);
            }
            Err(e) => {
                self.display.error = Some(error_message(kind, &e));
            }
        }
    }

    fn start_countdown(&mut self, target: DateTime<Utc>) {
        self.generation += 1;
        let generation = self.generation;
        let tick_tx = self.events_tx.clone();
        let finished_tx = self.events_tx.clone();

        self.engine.start(
            target,
            move |state| {
                let _ = tick_tx.send(AppEvent::Tick { generation, state });
            },
            move || {
                let _ = finished_tx.send(AppEvent::Finished { generation });
            },
        );
    }

    /// Whether the countdown task is running
    pub fn is_counting_down(&self) -> bool {
        self.engine.is_running()
    }

    /// Handles keyboard input
    ///
    /// Key bindings:
    /// - `q` or `Esc`: Quit the application (`Esc` closes help first)
    /// - `r`: Refresh the match, bypassing the cache
    /// - `c`: Clear the cached match
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.display.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.display.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                if !self.display.loading {
                    self.refresh();
                }
            }
            KeyCode::Char('c') => {
                self.clear_cache();
            }
            KeyCode::Char('?') => {
                self.display.show_help = true;
            }
            _ => {}
        }
    }
}

/// Formats kickoff in `timezone`, e.g. "Saturday, March 14, 2026 at 12:30 PM EDT"
pub fn format_kickoff(kickoff: DateTime<Utc>, timezone: Tz) -> String {
    kickoff
        .with_timezone(&timezone)
        .format("%A, %B %-d, %Y at %-I:%M %p %Z")
        .to_string()
}

/// User-facing text for a failed fetch
fn error_message(kind: FetchKind, error: &FetchError) -> String {
    match (kind, error) {
        (_, FetchError::NoUpcomingMatch) => NO_MATCH_MESSAGE.to_string(),
        (_, FetchError::MissingToken) => error.to_string(),
        (FetchKind::Load, _) => LOAD_FAILED_MESSAGE.to_string(),
        (FetchKind::Refresh, _) => REFRESH_FAILED_MESSAGE.to_string(),
    }
}

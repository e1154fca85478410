//! Next Match CLI - Count down to your club's next fixture
//!
//! A terminal UI application that shows a football club's next match and a
//! live countdown to kickoff, refreshing from football-data.org when the
//! cached fixture goes stale or kicks off.

use std::io;
use std::panic;
use std::process;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use nextmatch::app::{format_kickoff, App};
use nextmatch::cache::{FileStorage, MatchCache, MemoryStorage, Storage};
use nextmatch::cli::{api_token_from_env, AppConfig, Cli, RunMode};
use nextmatch::countdown::{compute_countdown, CountdownEngine};
use nextmatch::data::{FootballDataClient, MatchRecord};
use nextmatch::logging;
use nextmatch::ui::{self, match_view::fixture_line};

type Cache = MatchCache<Box<dyn Storage>, FootballDataClient>;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Prints the fixture, its local kickoff and the time left
fn print_match(match_record: &MatchRecord, config: &AppConfig) {
    let countdown = compute_countdown(match_record.utc_date, Utc::now());

    println!("{}", fixture_line(match_record));
    if let Some(competition) = match_record.competition() {
        println!("Competition: {}", competition);
    }
    println!("Kickoff: {}", format_kickoff(match_record.utc_date, config.timezone));
    if countdown.is_finished {
        println!("Countdown: kicked off");
    } else {
        println!("Countdown: {}", countdown);
    }
}

/// Reports what is cached without fetching
fn print_status(cache: &Cache, config: &AppConfig) {
    let Some(entry) = cache.peek() else {
        println!("No cached match");
        return;
    };

    print_match(&entry.match_record, config);
    println!(
        "Cached at: {}",
        format_kickoff(entry.cached_at, config.timezone)
    );
    if entry.is_valid_at(Utc::now()) {
        println!(
            "Expires: {}",
            format_kickoff(entry.expires_at, config.timezone)
        );
    } else {
        println!("Expired: next run will fetch again");
    }
}

/// Runs the full-screen countdown until the user quits
async fn run_interactive(cache: Cache, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (mut app, mut events) = App::new(cache, CountdownEngine::new(), config.timezone);
    app.load();

    let result = event_loop(&mut terminal, &mut app, &mut events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<Box<dyn Storage>, FootballDataClient>,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<nextmatch::app::AppEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = EventStream::new();

    loop {
        terminal.draw(|f| ui::render(f, &app.display))?;

        tokio::select! {
            maybe_input = input.next() => match maybe_input {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = events.recv() => app.handle_event(event),
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match AppConfig::from_cli(&cli) {
        Ok(config) => config.with_api_token(api_token_from_env()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let file_storage = FileStorage::new();
    let _log_guard = file_storage
        .as_ref()
        .and_then(|storage| logging::init(&storage.dir().join("logs")));

    let storage: Box<dyn Storage> = match file_storage {
        Some(storage) => Box::new(storage),
        None => {
            warn!("no home directory found, caching in memory only");
            Box::new(MemoryStorage::new())
        }
    };

    info!(team_id = config.team_id, mode = ?config.mode, "starting");

    let fetcher = FootballDataClient::new(config.team_id, config.api_token.clone());
    let cache = MatchCache::new(storage, fetcher).with_ttl(config.cache_ttl);

    match config.mode {
        RunMode::ClearCache => {
            cache.clear();
            println!("Cache cleared");
        }
        RunMode::Status => print_status(&cache, &config),
        RunMode::Once => match cache.get().await {
            Ok(match_record) => print_match(&match_record, &config),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        RunMode::Interactive => run_interactive(cache, &config).await?,
    }

    Ok(())
}

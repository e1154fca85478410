//! Command-line interface parsing for Next Match CLI
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`AppConfig`]: which club to follow, how long a fetched match
//! is trusted, which time zone kickoff is shown in, and what to run.

use chrono::Duration;
use chrono_tz::Tz;
use clap::Parser;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_TTL_HOURS;

/// football-data.org id of Manchester United
pub const DEFAULT_TEAM_ID: u32 = 66;

/// Zone kickoff times are shown in unless overridden
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Longest accepted cache TTL (one year)
pub const MAX_CACHE_TTL_HOURS: u64 = 8_760;

/// Environment variables checked for the API token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["FOOTBALL_DATA_TOKEN", "FOOTBALL_DATA_API_KEY"];

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The time zone is not a known IANA zone name
    #[error("Invalid time zone: '{0}'. Use an IANA name such as America/New_York or Europe/London")]
    InvalidTimezone(String),

    /// A zero TTL would make every read a refetch
    #[error("Invalid cache TTL: must be at least 1 hour")]
    ZeroTtl,

    /// The TTL is past what a cached entry can represent
    #[error("Invalid cache TTL: {0} hours is more than the maximum of 8760 (one year)")]
    TtlTooLarge(u64),
}

/// Next Match CLI - Count down to your club's next fixture
#[derive(Parser, Debug)]
#[command(name = "nextmatch")]
#[command(about = "Countdown to your football club's next match")]
#[command(version)]
pub struct Cli {
    /// football-data.org team id (66 = Manchester United)
    #[arg(long, value_name = "ID", default_value_t = DEFAULT_TEAM_ID)]
    pub team: u32,

    /// Hours a fetched match is trusted before fetching again
    ///
    /// A cached match is never trusted past its kickoff, whatever this is set to.
    #[arg(long, value_name = "HOURS", default_value_t = DEFAULT_CACHE_TTL_HOURS)]
    pub ttl_hours: u64,

    /// IANA time zone used to show kickoff
    #[arg(long, value_name = "TZ", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Remove the cached match and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Print the next match and countdown once instead of starting the TUI
    #[arg(long, conflicts_with = "clear_cache")]
    pub once: bool,

    /// Show the cached match, if any, without fetching
    #[arg(long, conflicts_with_all = ["clear_cache", "once"])]
    pub status: bool,
}

/// What the binary should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Full-screen countdown
    #[default]
    Interactive,
    /// Print once and exit
    Once,
    /// Report cache contents and exit
    Status,
    /// Clear the cache and exit
    ClearCache,
}

/// Configuration derived from CLI arguments and environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Team whose fixtures are followed
    pub team_id: u32,
    /// How long a fetched match is trusted
    pub cache_ttl: Duration,
    /// Zone kickoff is displayed in
    pub timezone: Tz,
    /// football-data.org API token
    pub api_token: Option<String>,
    /// What to run
    pub mode: RunMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            team_id: DEFAULT_TEAM_ID,
            cache_ttl: Duration::hours(DEFAULT_CACHE_TTL_HOURS as i64),
            timezone: chrono_tz::America::New_York,
            api_token: None,
            mode: RunMode::default(),
        }
    }
}

/// Parses a time zone argument into a `Tz`.
///
/// # Returns
/// * `Ok(Tz)` if the string is a known IANA zone
/// * `Err(CliError::InvalidTimezone)` otherwise
pub fn parse_timezone(s: &str) -> Result<Tz, CliError> {
    s.parse::<Tz>()
        .map_err(|_| CliError::InvalidTimezone(s.to_string()))
}

/// Reads the API token from the environment, ignoring blank values
pub fn api_token_from_env() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

impl AppConfig {
    /// Creates an AppConfig from parsed CLI arguments.
    ///
    /// The API token is not read here; see [`AppConfig::with_api_token`].
    ///
    /// # Returns
    /// * `Ok(AppConfig)` with validated settings
    /// * `Err(CliError)` if the time zone is unknown or the TTL is outside 1..=8760 hours
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.ttl_hours == 0 {
            return Err(CliError::ZeroTtl);
        }
        if cli.ttl_hours > MAX_CACHE_TTL_HOURS {
            return Err(CliError::TtlTooLarge(cli.ttl_hours));
        }

        let mode = if cli.clear_cache {
            RunMode::ClearCache
        } else if cli.status {
            RunMode::Status
        } else if cli.once {
            RunMode::Once
        } else {
            RunMode::Interactive
        };

        Ok(Self {
            team_id: cli.team,
            cache_ttl: Duration::hours(cli.ttl_hours as i64),
            timezone: parse_timezone(&cli.timezone)?,
            api_token: None,
            mode,
        })
    }

    /// Sets the API token
    pub fn with_api_token(mut self, api_token: Option<String>) -> Self {
        self.api_token = api_token;
        self
    }
}

//! Match data model and the fetcher seam
//!
//! A [`MatchRecord`] is whatever the scores API says about a fixture. The only
//! field the rest of the application relies on is the kickoff instant; every
//! other field is carried through untouched.

pub mod football;

pub use football::FootballDataClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use thiserror::Error;

/// A single fixture as returned by the scores API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Scheduled kickoff
    #[serde(rename = "utcDate")]
    pub utc_date: DateTime<Utc>,
    /// Every other field of the fixture, passed through as received
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl MatchRecord {
    /// Creates a record with no details beyond the kickoff time
    pub fn new(utc_date: DateTime<Utc>) -> Self {
        Self {
            utc_date,
            details: Map::new(),
        }
    }

    /// Adds a detail field, replacing any previous value under `key`
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Name of the home side, if the API provided one
    pub fn home_team(&self) -> Option<&str> {
        self.detail_str(&["homeTeam", "name"])
    }

    /// Name of the away side, if the API provided one
    pub fn away_team(&self) -> Option<&str> {
        self.detail_str(&["awayTeam", "name"])
    }

    /// Competition name (e.g. "Premier League")
    pub fn competition(&self) -> Option<&str> {
        self.detail_str(&["competition", "name"])
    }

    /// Stadium, when the API includes it
    pub fn venue(&self) -> Option<&str> {
        self.detail_str(&["venue"])
    }

    /// Follows `path` through nested objects and returns the string at the end
    fn detail_str(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        let mut value = self.details.get(*first)?;
        for key in rest {
            value = value.get(*key)?;
        }
        value.as_str()
    }
}

/// Errors that can occur when fetching the next match
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("API returned status {0}")]
    Status(u16),

    /// Failed to parse the API response
    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The club has no scheduled fixtures
    #[error("No upcoming matches found")]
    NoUpcomingMatch,

    /// No API token was configured
    #[error("API token not configured. Set FOOTBALL_DATA_TOKEN")]
    MissingToken,
}

/// Anything that can produce the club's next match
///
/// The cache calls this on every miss and on forced refreshes; failures are
/// handed back to the caller unchanged.
pub trait MatchFetcher: Send + Sync {
    /// Fetches the next scheduled fixture
    fn fetch_next_match(&self) -> impl Future<Output = Result<MatchRecord, FetchError>> + Send;
}

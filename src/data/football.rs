//! football-data.org API client
//!
//! Fetches a club's scheduled fixtures from the football-data.org v4 API and
//! picks the earliest one as the next match.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{FetchError, MatchFetcher, MatchRecord};

/// Base URL for the football-data.org v4 API
const FOOTBALL_DATA_BASE_URL: &str = "https://api.football-data.org/v4";

/// Fixture statuses that count as "upcoming"
const UPCOMING_STATUSES: &str = "SCHEDULED,TIMED";

/// Header carrying the API token
const AUTH_HEADER: &str = "X-Auth-Token";

/// Response body of `GET /teams/{id}/matches`
#[derive(Debug, Deserialize)]
struct MatchesResponse {
    /// Absent or `null` when the club has nothing scheduled
    #[serde(default)]
    matches: Option<Vec<MatchRecord>>,
}

/// Client for fetching a club's next match from football-data.org
#[derive(Debug, Clone)]
pub struct FootballDataClient {
    client: Client,
    team_id: u32,
    token: Option<String>,
    base_url: String,
}

impl FootballDataClient {
    /// Creates a client for the given team
    ///
    /// # Arguments
    /// * `team_id` - football-data.org team id (66 is Manchester United)
    /// * `token` - API token; fetches fail with `MissingToken` when absent
    pub fn new(team_id: u32, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            team_id,
            token,
            base_url: FOOTBALL_DATA_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different API root (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Team whose fixtures this client fetches
    pub fn team_id(&self) -> u32 {
        self.team_id
    }

    fn matches_url(&self) -> String {
        format!(
            "{}/teams/{}/matches",
            self.base_url.trim_end_matches('/'),
            self.team_id
        )
    }

    /// Fetches upcoming fixtures and returns the earliest
    ///
    /// # Returns
    /// * `Ok(MatchRecord)` - The next scheduled fixture
    /// * `Err(FetchError)` - Missing token, transport/status failure, bad body,
    ///   or no upcoming fixture
    pub async fn fetch_next(&self) -> Result<MatchRecord, FetchError> {
        let token = self.token.as_deref().ok_or(FetchError::MissingToken)?;
        let url = self.matches_url();

        debug!(%url, team_id = self.team_id, "requesting upcoming fixtures");

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, token)
            .query(&[("status", UPCOMING_STATUSES)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let body: MatchesResponse = serde_json::from_str(&text)?;

        next_match(body.matches.unwrap_or_default()).ok_or(FetchError::NoUpcomingMatch)
    }
}

impl MatchFetcher for FootballDataClient {
    async fn fetch_next_match(&self) -> Result<MatchRecord, FetchError> {
        self.fetch_next().await
    }
}

/// Picks the fixture with the earliest kickoff
fn next_match(matches: Vec<MatchRecord>) -> Option<MatchRecord> {
    matches.into_iter().min_by_key(|m| m.utc_date)
}

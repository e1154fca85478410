//! Integration tests for CLI argument handling
//!
//! Runs the binary against a throwaway cache directory and checks the
//! non-interactive modes.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
///
/// HOME and XDG_CACHE_HOME point into `home` and no API token is set.
fn run_cli(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_nextmatch"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CACHE_HOME", home.join(".cache"))
        .env_remove("FOOTBALL_DATA_TOKEN")
        .env_remove("FOOTBALL_DATA_API_KEY")
        .output()
        .expect("Failed to execute nextmatch")
}

fn temp_home() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

#[test]
fn test_help_flag_exits_successfully() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nextmatch"), "Help should mention nextmatch");
    assert!(stdout.contains("--team"), "Help should mention --team flag");
    assert!(stdout.contains("--timezone"), "Help should mention --timezone flag");
}

#[test]
fn test_invalid_timezone_prints_error_and_exits() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--timezone", "Mars/Olympus_Mons", "--status"]);
    assert!(
        !output.status.success(),
        "Expected invalid time zone to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid time zone"),
        "Should print error message about the time zone: {}",
        stderr
    );
}

#[test]
fn test_oversized_ttl_is_rejected_before_fetching() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--once", "--ttl-hours", "3000000000"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid cache TTL"),
        "Should print error message about the TTL: {}",
        stderr
    );
    assert!(!stderr.contains("panicked"));
}

#[test]
fn test_conflicting_modes_are_rejected() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--once", "--clear-cache"]);
    assert!(!output.status.success());
}

#[test]
fn test_clear_cache_with_nothing_cached_succeeds() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--clear-cache"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cache cleared"));
}

#[test]
fn test_status_with_empty_cache() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--status"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No cached match"), "Unexpected output: {}", stdout);
}

#[test]
fn test_once_without_token_fails_with_hint() {
    let home = temp_home();
    let output = run_cli(home.path(), &["--once"]);
    assert!(!output.status.success(), "Expected --once without a token to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("FOOTBALL_DATA_TOKEN"),
        "Should say which variable to set: {}",
        stderr
    );
}

#[cfg(target_os = "linux")]
mod seeded_cache {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn seed_cache(home: &Path) {
        let dir = home.join(".cache").join("nextmatch");
        std::fs::create_dir_all(&dir).expect("Failed to create cache dir");

        let kickoff = Utc.with_ymd_and_hms(2099, 1, 1, 15, 0, 0).unwrap();
        let now = Utc::now();
        let entry = serde_json::json!({
            "match": {
                "utcDate": "2099-01-01T15:00:00Z",
                "homeTeam": { "name": "Manchester United FC" },
                "awayTeam": { "name": "Arsenal FC" },
                "competition": { "name": "Premier League" }
            },
            "cachedAt": now.timestamp_millis(),
            "expiresAt": (now + Duration::hours(6)).min(kickoff).timestamp_millis()
        });
        std::fs::write(dir.join("next_match.json"), entry.to_string())
            .expect("Failed to seed cache");
    }

    #[test]
    fn test_status_shows_cached_match() {
        let home = temp_home();
        seed_cache(home.path());

        let output = run_cli(home.path(), &["--status"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("Manchester United FC vs Arsenal FC"),
            "Unexpected output: {}",
            stdout
        );
        assert!(stdout.contains("Premier League"));
        assert!(stdout.contains("Expires:"));
    }

    #[test]
    fn test_once_serves_valid_cache_without_token() {
        let home = temp_home();
        seed_cache(home.path());

        let output = run_cli(home.path(), &["--once", "--timezone", "Europe/London"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Manchester United FC vs Arsenal FC"));
        assert!(stdout.contains("Thursday, January 1, 2099 at 3:00 PM GMT"));
        assert!(stdout.contains("Countdown:"));
    }

    #[test]
    fn test_clear_cache_removes_seeded_entry() {
        let home = temp_home();
        seed_cache(home.path());

        assert!(run_cli(home.path(), &["--clear-cache"]).status.success());

        let output = run_cli(home.path(), &["--status"]);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("No cached match"));
        assert!(!home
            .path()
            .join(".cache/nextmatch/next_match.json")
            .exists());
    }
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use chrono::Duration;
    use clap::Parser;
    use nextmatch::cli::{AppConfig, Cli, RunMode};

    #[test]
    fn test_cli_no_args_is_interactive() {
        let cli = Cli::parse_from(["nextmatch"]);
        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, RunMode::Interactive);
    }

    #[test]
    fn test_cli_ttl_flag_sets_cache_ttl() {
        let cli = Cli::parse_from(["nextmatch", "--ttl-hours", "12"]);
        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cache_ttl, Duration::hours(12));
    }

    #[test]
    fn test_cli_team_flag_sets_team() {
        let cli = Cli::parse_from(["nextmatch", "--team", "64"]);
        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.team_id, 64);
    }

    #[test]
    fn test_cli_timezone_flag_sets_zone() {
        let cli = Cli::parse_from(["nextmatch", "--timezone", "Asia/Tokyo"]);
        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_cli_rejects_non_numeric_team() {
        assert!(Cli::try_parse_from(["nextmatch", "--team", "united"]).is_err());
    }
}

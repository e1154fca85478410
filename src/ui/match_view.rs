//! Match countdown screen rendering
//!
//! Renders the single screen of the app: the fixture, its local kickoff time,
//! the live countdown and a status line for loading, refresh and errors.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::DisplayState;
use crate::countdown::CountdownState;
use crate::data::MatchRecord;

/// Placeholder for team names the API left out
const UNKNOWN_TEAM: &str = "TBD";

/// Color of the countdown: green at kickoff, yellow on match day
fn countdown_color(countdown: &CountdownState) -> Color {
    if countdown.is_finished {
        Color::Green
    } else if countdown.is_urgent() {
        Color::Yellow
    } else {
        Color::White
    }
}

/// "Home vs Away" line for the fixture
pub fn fixture_line(match_record: &MatchRecord) -> String {
    format!(
        "{} vs {}",
        match_record.home_team().unwrap_or(UNKNOWN_TEAM),
        match_record.away_team().unwrap_or(UNKNOWN_TEAM)
    )
}

/// Text shown for the countdown
fn countdown_text(countdown: &CountdownState) -> String {
    if countdown.is_finished {
        "Kickoff!".to_string()
    } else {
        countdown.to_string()
    }
}

/// Renders the match screen
pub fn render(frame: &mut Frame, state: &DisplayState) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(7),    // Match details
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_title(frame, chunks[0]);
    render_match(frame, chunks[1], state);
    render_status(frame, chunks[2], state);
    render_help_text(frame, chunks[3]);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Next Match",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(title, area);
}

fn render_match(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let Some(match_record) = &state.match_record else {
        let placeholder = if state.loading {
            "Loading match information..."
        } else {
            "No match to show"
        };
        let paragraph = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            fixture_line(match_record),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let context: Vec<&str> = [match_record.competition(), match_record.venue()]
        .into_iter()
        .flatten()
        .collect();
    if !context.is_empty() {
        lines.push(Line::from(Span::styled(
            context.join(" \u{00B7} "),
            Style::default().fg(Color::Gray),
        )));
    }

    if let Some(kickoff) = &state.kickoff_local {
        lines.push(Line::from(kickoff.clone()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        countdown_text(&state.countdown),
        Style::default()
            .fg(countdown_color(&state.countdown))
            .add_modifier(Modifier::BOLD),
    )));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let line = if state.refreshing {
        Line::from(Span::styled(
            "Refreshing...",
            Style::default().fg(Color::Cyan),
        ))
    } else if let Some(error) = &state.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_help_text(frame: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" refresh  "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(" clear cache  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]);

    let paragraph = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

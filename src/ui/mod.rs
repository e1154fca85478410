//! UI rendering module for Next Match CLI
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod match_view;

use ratatui::Frame;

use crate::app::DisplayState;

/// Draws the match screen, with the help overlay on top when open
pub fn render(frame: &mut Frame, state: &DisplayState) {
    match_view::render(frame, state);

    if state.show_help {
        help_overlay::render(frame);
    }
}

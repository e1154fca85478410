//! Next Match CLI Library
//!
//! Counts down to a football club's next fixture. Exposes the cache, the
//! countdown engine and the app state for the binary and integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod countdown;
pub mod data;
pub mod logging;
pub mod ui;

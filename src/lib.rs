//! Modal overlay dialogs: a promise-based overlay core and a terminal front-end.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod overlay;
pub mod theme;
pub mod tui;
pub mod ui;

pub use theme::Theme;

//! # lex-cli
//!
//! The `lex` binary: serve the HTTP API, load the seed corpus, check a
//! deployment, or answer a single question from the terminal.

pub mod cli;
pub mod commands;
pub mod settings;
pub mod wiring;

pub use cli::{Cli, Commands};
pub use settings::Settings;

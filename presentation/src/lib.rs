//! Presentation layer for the Multi-Agent Orchestration Core.
//!
//! This crate contains CLI argument definitions, output formatters, and a
//! console progress reporter. It depends on `domain` and `application` only.

pub mod cli;
pub mod output;
pub mod progress;

pub use cli::{Cli, Command, OutputFormat};
pub use output::ConsoleFormatter;
pub use progress::ConsoleProgress;

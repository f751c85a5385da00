//! Output formatting for orchestration results.

pub mod console;

pub use console::ConsoleFormatter;

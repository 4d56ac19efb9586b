//! Presentation layer for panel-consult
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive panel approval prompt.

pub mod approval;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use approval::InteractiveApproval;
pub use cli::commands::{Cli, LevelArg, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};

//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for consultation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with the panel and every answer's status
    Full,
    /// Only the final synthesis
    Synthesis,
    /// JSON dump of the whole session
    Json,
}

/// Expertise level accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Junior,
    Mid,
    Senior,
    Expert,
}

impl LevelArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelArg::Junior => "junior",
            LevelArg::Mid => "mid",
            LevelArg::Senior => "senior",
            LevelArg::Expert => "expert",
        }
    }
}

/// CLI arguments for panel-consult
#[derive(Parser, Debug)]
#[command(name = "panel-consult")]
#[command(author, version, about = "Ask a panel of specialists and get one combined answer")]
#[command(long_about = r#"
panel-consult answers a question by consulting a panel of specialist roles.

The process has four stages:
1. Proposal: A model decides whether a panel helps and proposes specialists
2. Approval: You keep or drop each proposed specialist
3. Consultation: Every kept specialist answers its own tailored question in parallel
4. Synthesis: All answers are merged into one combined response

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./panel.toml        Project-level config
3. ~/.config/panel-consult/config.toml   Global config

Environment variables prefixed with PANEL_ override file values
(e.g. PANEL_PROVIDER__MODEL=gpt-4o).

Example:
  panel-consult "Should we move billing to event sourcing?"
  panel-consult -y --level expert "How do we harden our OAuth flow?"
  panel-consult -o json --max-concurrency 2 "Plan a GDPR audit"
"#)]
pub struct Cli {
    /// The question to put to the panel
    pub question: Option<String>,

    /// Approve every proposed specialist without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Project the master node belongs to
    #[arg(long, value_name = "NAME", default_value = "default")]
    pub project: String,

    /// Title for the master node
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Model used for proposal, consultation and synthesis
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum specialists answering at the same time
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Per-specialist time limit in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Maximum specialists accepted from a proposal
    #[arg(long, value_name = "N")]
    pub max_roles: Option<usize>,

    /// Depth the specialists answer at
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub level: Option<LevelArg>,

    /// Pass the master node's conversation to every specialist
    #[arg(long)]
    pub master_context: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write tracing output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

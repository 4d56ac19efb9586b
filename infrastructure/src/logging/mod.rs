//! Logging infrastructure: structured session event logging.
//!
//! Provides [`JsonlSessionLogger`], a JSONL file writer that implements
//! the [`SessionLogger`](panel_application::SessionLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlSessionLogger;

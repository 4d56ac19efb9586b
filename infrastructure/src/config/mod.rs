//! Configuration file loading for panel-consult
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `PANEL_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./panel.toml` or `./.panel.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/panel-consult/config.toml`
//!    (fallback `~/.config/panel-consult/config.toml`)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConsultationConfig, FileLoggingConfig,
    FileProviderConfig, FileRoleConfig,
};
pub use loader::ConfigLoader;

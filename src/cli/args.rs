//! Launcher options
//!
//! Every command-line argument belongs to the script, so the launcher reads
//! its own settings from the environment only.

use clap::{ArgAction, Parser};

use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "lualaunch")]
#[command(author, version, about = "Find Launch.lua and run it in the module it names", long_about = None)]
pub struct LauncherOptions {
    /// Log filter (tracing directive syntax)
    #[arg(long, env = "LUALAUNCH_LOG", default_value = "warn")]
    pub log: String,

    /// Insert discovered scripts by their short (8.3) path
    #[arg(long, env = "LUALAUNCH_SHORT_PATHS", default_value_t = false, action = ArgAction::Set)]
    pub short_paths: bool,

    /// Wait for Enter after a module fails to load
    #[arg(long, env = "LUALAUNCH_PAUSE_ON_ERROR", default_value_t = true, action = ArgAction::Set)]
    pub pause_on_error: bool,
}

impl Default for LauncherOptions {
    fn default() -> Self {
        Self {
            log: "warn".to_string(),
            short_paths: false,
            pause_on_error: true,
        }
    }
}

impl LauncherOptions {
    /// Read options from the environment, leaving the real arguments alone
    pub fn from_env() -> Result<Self> {
        Self::try_parse_from(["lualaunch"]).map_err(|e| LaunchError::Config(e.to_string()))
    }

    /// Apply the options on top of a product layout
    pub fn apply(&self, config: &mut LauncherConfig) {
        config.short_paths = self.short_paths;
        config.pause_on_error = self.pause_on_error;
    }
}

//! Error types for lualaunch

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Could not find a valid launcher lua file.")]
    ScriptNotFound,

    #[error("Could not find dll named '{module}': {reason}")]
    ModuleNotFound { module: String, reason: String },

    #[error("DLL '{module}' does not appear to be a Path of Building dll.")]
    InvalidModule { module: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LaunchError {
    /// Whether the console should wait for the user after reporting this error
    pub fn wants_pause(&self) -> bool {
        matches!(self, LaunchError::ModuleNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;

//! Installed layout the launcher knows how to find
//!
//! Everything here is fixed per product. [`LauncherConfig::default`] carries
//! the production values; tests build their own.

use std::env::consts::DLL_SUFFIX;

/// Per-user installer record: registry key under `HKEY_CURRENT_USER`
pub const INSTALLER_KEY: &str =
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Path of Building Community";

/// Value under [`INSTALLER_KEY`] holding the install directory
pub const INSTALLER_VALUE: &str = "InstallLocation";

/// Product layout and launcher options
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// File name of the startup script
    pub script_name: String,
    /// Registry key written by the installer
    pub installer_key: String,
    /// Registry value holding the install location
    pub installer_value: String,
    /// Subdirectory of the roaming application-data folder
    pub roaming_subdir: String,
    /// Subdirectory of the machine-wide application-data folder
    pub common_subdir: String,
    /// Directory holding the scripts in a source checkout
    pub source_dir: String,
    /// Directory holding the binaries in a source checkout
    pub runtime_dir: String,
    /// Entry symbol for modules that run without a console
    pub windowed_entry: String,
    /// Entry symbol for modules that need a console
    pub console_entry: String,
    /// Interpreter module preloaded for scripts in a source checkout
    pub interpreter_module: String,
    /// File extension of loadable modules, including the dot
    pub module_suffix: String,
    /// Insert discovered scripts by their short (8.3) path
    pub short_paths: bool,
    /// Wait for the user after a module fails to load
    pub pause_on_error: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            script_name: "Launch.lua".to_string(),
            installer_key: INSTALLER_KEY.to_string(),
            installer_value: INSTALLER_VALUE.to_string(),
            roaming_subdir: "Path of Building Community".to_string(),
            common_subdir: "Path of Building".to_string(),
            source_dir: "src".to_string(),
            runtime_dir: "runtime".to_string(),
            windowed_entry: "RunLuaFileAsWin".to_string(),
            console_entry: "RunLuaFileAsConsole".to_string(),
            interpreter_module: "lua51".to_string(),
            module_suffix: DLL_SUFFIX.to_string(),
            short_paths: false,
            pause_on_error: true,
        }
    }
}

//! Launcher options and the process command line

pub mod args;
pub mod command_line;

pub use args::LauncherOptions;
pub use command_line::CommandLine;

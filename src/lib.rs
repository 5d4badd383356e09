//! lualaunch - bootstrap launcher for Lua applications
//!
//! The launcher finds a `Launch.lua` script, reads the name of the native
//! module that runs it from the script's `#@` directive line, loads that
//! module and passes it the command line.
//!
//! # Example
//!
//! ```no_run
//! use lualaunch::platform::{NativeConsole, NativeHost, NativeLoader};
//! use lualaunch::{CommandLine, Launcher, LauncherConfig};
//!
//! let config = LauncherConfig::default();
//! let mut console = NativeConsole::default();
//! let status = Launcher::new(&config, &NativeHost, &NativeLoader, &mut console)
//!     .run(CommandLine::from_env());
//! std::process::exit(status);
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod platform;
pub mod script;
pub mod text;

#[cfg(test)]
mod testing;

pub use cli::{CommandLine, LauncherOptions};
pub use config::LauncherConfig;
pub use dispatch::{EntryPoint, Launcher};
pub use error::{LaunchError, Result};
pub use script::{validate, Directive, ScriptLocator};

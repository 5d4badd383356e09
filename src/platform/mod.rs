//! OS services the launcher depends on
//!
//! The discovery and dispatch logic only talks to the traits below. The
//! native implementations live in `windows.rs` and `unix.rs`; tests supply
//! their own.

use std::ffi::{c_char, c_int, OsStr, OsString};
use std::io;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use self::windows::{to_narrow, Library, NativeConsole, NativeHost, NativeLoader};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use self::unix::{to_narrow, Library, NativeConsole, NativeHost, NativeLoader};

/// Signature shared by both module entry points
pub type EntryFn = unsafe extern "C" fn(argc: c_int, argv: *mut *mut c_char) -> c_int;

/// Where the launcher looks for an installed script
pub trait Host {
    /// Directory containing the running executable
    fn executable_dir(&self) -> Option<String>;

    /// String value from the per-user installer record
    fn installer_location(&self, key: &str, value: &str) -> Option<String>;

    /// Per-user roaming application-data folder
    fn roaming_app_data(&self) -> Option<String>;

    /// Machine-wide application-data folder
    fn common_app_data(&self) -> Option<String>;

    /// Long (non-abbreviated) form of an existing path
    fn long_path(&self, path: &OsStr) -> Option<OsString>;

    /// Short (8.3) form of an existing path
    fn short_path(&self, path: &str) -> Option<String>;
}

/// Loads modules by name
pub trait ModuleLoader {
    type Module: LoadedModule;

    fn load(&self, name: &str) -> io::Result<Self::Module>;
}

/// A loaded module; dropping it unloads the module
pub trait LoadedModule {
    /// Look up an exported entry point
    fn entry(&self, symbol: &str) -> Option<EntryFn>;
}

/// The console, allocated only when something needs to be shown
pub trait Console {
    /// Make a console visible; calling it again is a no-op
    fn show(&mut self);

    fn set_title(&mut self, title: &OsStr);

    /// Show a fatal error to the user
    fn report(&mut self, message: &str);

    /// Block until the user acknowledges
    fn pause(&mut self);
}

/// Directory of the running executable, shared by both native hosts
fn current_exe_dir() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    exe.parent()?.to_str().map(str::to_owned)
}

fn roaming_dir() -> Option<String> {
    dirs::config_dir()?.into_os_string().into_string().ok()
}

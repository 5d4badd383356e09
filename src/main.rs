//! lualaunch - find Launch.lua and run it in the module it names

#![cfg_attr(windows, windows_subsystem = "windows")]

use lualaunch::platform::{NativeConsole, NativeHost, NativeLoader};
use lualaunch::{logging, CommandLine, Launcher, LauncherConfig, LauncherOptions};

fn main() {
    let (options, options_error) = match LauncherOptions::from_env() {
        Ok(options) => (options, None),
        Err(e) => (LauncherOptions::default(), Some(e)),
    };

    logging::init(&options.log);
    if let Some(e) = options_error {
        tracing::warn!("{}; using default launcher options", e);
    }

    let mut config = LauncherConfig::default();
    options.apply(&mut config);

    let mut console = NativeConsole::default();
    let status = Launcher::new(&config, &NativeHost, &NativeLoader, &mut console)
        .run(CommandLine::from_env());

    std::process::exit(status);
}

//! Module entry points

use std::ffi::{c_int, OsStr};

use crate::config::LauncherConfig;
use crate::dispatch::marshal::ArgumentBlock;
use crate::platform::{Console, EntryFn, LoadedModule};

/// The entry point a module exports, by flavour
#[derive(Debug, Clone, Copy)]
pub enum EntryPoint {
    /// Runs without a console
    Windowed(EntryFn),
    /// Expects a visible console
    Console(EntryFn),
}

impl EntryPoint {
    /// Find the module's entry point, windowed first
    ///
    /// Falling back to the console entry shows the console and titles it
    /// with `script` before the lookup.
    pub fn resolve<M, C>(module: &M, config: &LauncherConfig, console: &mut C, script: &OsStr) -> Option<Self>
    where
        M: LoadedModule + ?Sized,
        C: Console + ?Sized,
    {
        if let Some(entry) = module.entry(&config.windowed_entry) {
            return Some(EntryPoint::Windowed(entry));
        }

        console.show();
        console.set_title(script);
        module.entry(&config.console_entry).map(EntryPoint::Console)
    }

    pub fn name<'c>(&self, config: &'c LauncherConfig) -> &'c str {
        match self {
            EntryPoint::Windowed(_) => &config.windowed_entry,
            EntryPoint::Console(_) => &config.console_entry,
        }
    }

    /// Call into the module; its return value is the exit status
    pub fn invoke(&self, args: &mut ArgumentBlock) -> c_int {
        let entry = match self {
            EntryPoint::Windowed(entry) | EntryPoint::Console(entry) => *entry,
        };
        unsafe { entry(args.argc(), args.argv()) }
    }
}

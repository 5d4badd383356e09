//! The launch sequence
//!
//! locate script → module name → optional interpreter preload → load module
//! → entry point → marshal arguments → invoke → unload. Every failure is
//! final and exits with status 1.

use std::ffi::{c_int, OsStr, OsString};
use std::path::Path;

use crate::cli::CommandLine;
use crate::config::LauncherConfig;
use crate::dispatch::entry::EntryPoint;
use crate::dispatch::marshal::{marshal, ArgumentBlock};
use crate::error::{LaunchError, Result};
use crate::platform::{Console, Host, ModuleLoader};
use crate::script::ScriptLocator;

/// Exit status for every launcher failure
pub const FAILURE_STATUS: c_int = 1;

/// Whether `script` sits in the `src` directory of a source checkout
pub fn is_dev_script(script: &OsStr, source_dir: &str) -> bool {
    Path::new(script)
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == OsStr::new(source_dir))
}

pub struct Launcher<'a, H: ?Sized, L: ?Sized, C: ?Sized> {
    config: &'a LauncherConfig,
    host: &'a H,
    loader: &'a L,
    console: &'a mut C,
}

impl<'a, H, L, C> Launcher<'a, H, L, C>
where
    H: Host + ?Sized,
    L: ModuleLoader + ?Sized,
    C: Console + ?Sized,
{
    pub fn new(config: &'a LauncherConfig, host: &'a H, loader: &'a L, console: &'a mut C) -> Self {
        Self {
            config,
            host,
            loader,
            console,
        }
    }

    /// Run the launch sequence and return the process exit status
    pub fn run(&mut self, command_line: CommandLine) -> c_int {
        match self.launch(command_line) {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("{}", e);
                self.console.report(&e.to_string());
                if e.wants_pause() && self.config.pause_on_error {
                    self.console.pause();
                }
                FAILURE_STATUS
            }
        }
    }

    /// Run the launch sequence; the module is unloaded before this returns
    pub fn launch(&mut self, mut command_line: CommandLine) -> Result<c_int> {
        let directive = ScriptLocator::new(self.config, self.host)
            .resolve(&mut command_line)
            .ok_or(LaunchError::ScriptNotFound)?;
        let script = command_line.script().map(OsStr::to_os_string).unwrap_or_default();

        let module_name = directive.module_name(&self.config.module_suffix);
        tracing::debug!("{} wants module {}", script.to_string_lossy(), module_name);

        let _interpreter = if is_dev_script(&script, &self.config.source_dir) {
            self.preload_interpreter()
        } else {
            None
        };

        let module = self.loader.load(&module_name).map_err(|e| LaunchError::ModuleNotFound {
            module: module_name.clone(),
            reason: e.to_string(),
        })?;

        let entry = EntryPoint::resolve(&module, self.config, &mut *self.console, &script)
            .ok_or_else(|| LaunchError::InvalidModule {
                module: module_name.clone(),
            })?;
        tracing::info!("running {} from {}", entry.name(self.config), module_name);

        let mut args = ArgumentBlock::pack(forwarded_args(command_line.args()));
        let status = entry.invoke(&mut args);
        tracing::info!("{} exited with status {}", module_name, status);

        drop(module);
        Ok(status)
    }

    /// Best-effort load of the interpreter a source checkout relies on
    fn preload_interpreter(&self) -> Option<L::Module> {
        let name = format!("{}{}", self.config.interpreter_module, self.config.module_suffix);
        match self.loader.load(&name) {
            Ok(module) => {
                tracing::debug!("preloaded {}", name);
                Some(module)
            }
            Err(e) => {
                tracing::warn!("could not preload {}: {}", name, e);
                None
            }
        }
    }
}

/// Narrow arguments for the module: everything but the launcher's own path
fn forwarded_args(args: &[OsString]) -> impl Iterator<Item = Vec<u8>> {
    marshal(args).into_iter().skip(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::EntryFn;
    use crate::testing::{dir_string, write_script, FakeConsole, FakeHost, FakeLoader};
    use std::cell::RefCell;
    use std::ffi::{c_char, CStr};
    use tempfile::TempDir;

    thread_local! {
        static RECEIVED: RefCell<Vec<String>> = RefCell::new(Vec::new());
    }

    unsafe fn collect_args(argc: c_int, argv: *mut *mut c_char) -> Vec<String> {
        (0..argc as usize)
            .map(|i| CStr::from_ptr(*argv.add(i)).to_string_lossy().into_owned())
            .collect()
    }

    unsafe extern "C" fn run_windowed(argc: c_int, argv: *mut *mut c_char) -> c_int {
        let args = collect_args(argc, argv);
        RECEIVED.with(|received| *received.borrow_mut() = args);
        42
    }

    unsafe extern "C" fn run_console(argc: c_int, argv: *mut *mut c_char) -> c_int {
        let args = collect_args(argc, argv);
        RECEIVED.with(|received| *received.borrow_mut() = args);
        7
    }

    const WINDOWED: EntryFn = run_windowed;
    const CONSOLE: EntryFn = run_console;

    fn received() -> Vec<String> {
        RECEIVED.with(|received| received.borrow().clone())
    }

    fn config() -> LauncherConfig {
        LauncherConfig {
            module_suffix: ".dll".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_from_executable_dir() {
        let exe_dir = TempDir::new().unwrap();
        let script = write_script(exe_dir.path(), "MyEngine");

        let config = config();
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default().with_module("MyEngine.dll", &[("RunLuaFileAsWin", WINDOWED)]);
        let mut console = FakeConsole::watching(&loader.events);

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, 42);
        assert_eq!(received(), vec![script]);
        assert_eq!(loader.events(), vec!["load MyEngine.dll", "unload MyEngine.dll"]);
        assert_eq!(console.shown, 0);
        assert!(console.reports.is_empty());
    }

    #[test]
    fn test_forwards_arguments_after_script() {
        let exe_dir = TempDir::new().unwrap();
        let script = write_script(exe_dir.path(), "SimpleGraphic.dll");

        let config = config();
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default().with_module("SimpleGraphic.dll", &[("RunLuaFileAsWin", WINDOWED)]);
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe", "build.xml", "--dev"]));

        assert_eq!(status, 42);
        assert_eq!(received(), vec![script, "build.xml".to_string(), "--dev".to_string()]);
    }

    #[test]
    fn test_no_script_anywhere() {
        let empty = TempDir::new().unwrap();

        let config = config();
        let host = FakeHost {
            exe_dir: Some(dir_string(empty.path())),
            roaming: Some(dir_string(empty.path())),
            common: Some(dir_string(empty.path())),
            ..Default::default()
        };
        let loader = FakeLoader::default().with_module("MyEngine.dll", &[("RunLuaFileAsWin", WINDOWED)]);
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, FAILURE_STATUS);
        assert!(loader.events().is_empty());
        assert_eq!(console.reports, vec!["Could not find a valid launcher lua file."]);
        assert_eq!(console.pauses, 0);
    }

    #[test]
    fn test_missing_module_reports_and_pauses() {
        let exe_dir = TempDir::new().unwrap();
        write_script(exe_dir.path(), "Missing");

        let config = config();
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default();
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, FAILURE_STATUS);
        assert_eq!(console.reports.len(), 1);
        assert!(console.reports[0].starts_with("Could not find dll named 'Missing.dll'"));
        assert_eq!(console.pauses, 1);
    }

    #[test]
    fn test_missing_module_without_pause() {
        let exe_dir = TempDir::new().unwrap();
        write_script(exe_dir.path(), "Missing");

        let config = LauncherConfig {
            pause_on_error: false,
            ..config()
        };
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default();
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, FAILURE_STATUS);
        assert_eq!(console.pauses, 0);
    }

    #[test]
    fn test_console_entry_shows_console() {
        let exe_dir = TempDir::new().unwrap();
        let script = write_script(exe_dir.path(), "ConsoleEngine");

        let config = config();
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default().with_module("ConsoleEngine.dll", &[("RunLuaFileAsConsole", CONSOLE)]);
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, 7);
        assert_eq!(console.shown, 1);
        assert_eq!(console.title, Some(OsString::from(&script)));
        assert!(console.reports.is_empty());
    }

    #[test]
    fn test_windowed_entry_preferred() {
        let exe_dir = TempDir::new().unwrap();
        write_script(exe_dir.path(), "Both");

        let config = config();
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default().with_module(
            "Both.dll",
            &[("RunLuaFileAsConsole", CONSOLE), ("RunLuaFileAsWin", WINDOWED)],
        );
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, 42);
        assert_eq!(console.shown, 0);
        assert!(console.title.is_none());
    }

    #[test]
    fn test_invalid_module_unloaded_before_report() {
        let exe_dir = TempDir::new().unwrap();
        write_script(exe_dir.path(), "NotAnEngine");

        let config = config();
        let host = FakeHost::with_exe_dir(exe_dir.path());
        let loader = FakeLoader::default().with_module("NotAnEngine.dll", &[]);
        let mut console = FakeConsole::watching(&loader.events);

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe"]));

        assert_eq!(status, FAILURE_STATUS);
        assert_eq!(
            console.reports,
            vec!["DLL 'NotAnEngine.dll' does not appear to be a Path of Building dll."]
        );
        assert_eq!(
            console.events_at_report,
            vec![vec!["load NotAnEngine.dll".to_string(), "unload NotAnEngine.dll".to_string()]]
        );
        assert_eq!(console.pauses, 0);
    }

    #[test]
    fn test_dev_layout_preloads_interpreter() {
        let checkout = TempDir::new().unwrap();
        let script = write_script(&checkout.path().join("src"), "SimpleGraphic");

        let config = config();
        let host = FakeHost::default();
        let loader = FakeLoader::default()
            .with_module("lua51.dll", &[])
            .with_module("SimpleGraphic.dll", &[("RunLuaFileAsWin", WINDOWED)]);
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe", script.as_str()]));

        assert_eq!(status, 42);
        assert_eq!(
            loader.events(),
            vec![
                "load lua51.dll",
                "load SimpleGraphic.dll",
                "unload SimpleGraphic.dll",
                "unload lua51.dll",
            ]
        );
        assert!(host.queried.borrow().is_empty());
    }

    #[test]
    fn test_dev_layout_interpreter_failure_is_not_fatal() {
        let checkout = TempDir::new().unwrap();
        let script = write_script(&checkout.path().join("src"), "SimpleGraphic");

        let config = config();
        let host = FakeHost::default();
        let loader = FakeLoader::default().with_module("SimpleGraphic.dll", &[("RunLuaFileAsWin", WINDOWED)]);
        let mut console = FakeConsole::default();

        let status = Launcher::new(&config, &host, &loader, &mut console)
            .run(CommandLine::new(["launcher.exe", script.as_str()]));

        assert_eq!(status, 42);
        assert_eq!(loader.events()[0], "load lua51.dll");
        assert!(console.reports.is_empty());
    }

    #[test]
    fn test_is_dev_script() {
        let sep = std::path::MAIN_SEPARATOR;
        assert!(is_dev_script(OsStr::new(&format!("pob{sep}src{sep}Launch.lua")), "src"));
        assert!(!is_dev_script(OsStr::new(&format!("pob{sep}runtime{sep}Launch.lua")), "src"));
        assert!(!is_dev_script(OsStr::new(&format!("src{sep}pob{sep}Launch.lua")), "src"));
        assert!(!is_dev_script(OsStr::new("Launch.lua"), "src"));
    }
}

//! Fake OS services for unit tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::platform::{Console, EntryFn, Host, LoadedModule, ModuleLoader};
use crate::script::SearchRoot;

/// Host with fixed roots that records which roots were asked for
#[derive(Default)]
pub struct FakeHost {
    pub exe_dir: Option<String>,
    pub installer: Option<String>,
    pub roaming: Option<String>,
    pub common: Option<String>,
    pub long_paths: HashMap<OsString, OsString>,
    pub short_paths: bool,
    pub queried: RefCell<Vec<SearchRoot>>,
}

impl FakeHost {
    pub fn with_exe_dir(dir: &Path) -> Self {
        Self {
            exe_dir: Some(dir_string(dir)),
            ..Default::default()
        }
    }
}

impl Host for FakeHost {
    fn executable_dir(&self) -> Option<String> {
        self.queried.borrow_mut().push(SearchRoot::ExecutableDir);
        self.exe_dir.clone()
    }

    fn installer_location(&self, key: &str, value: &str) -> Option<String> {
        assert_eq!(value, "InstallLocation");
        assert!(key.ends_with("Path of Building Community"));
        self.queried.borrow_mut().push(SearchRoot::InstallerRecord);
        self.installer.clone()
    }

    fn roaming_app_data(&self) -> Option<String> {
        self.queried.borrow_mut().push(SearchRoot::RoamingAppData);
        self.roaming.clone()
    }

    fn common_app_data(&self) -> Option<String> {
        self.queried.borrow_mut().push(SearchRoot::CommonAppData);
        self.common.clone()
    }

    fn long_path(&self, path: &OsStr) -> Option<OsString> {
        self.long_paths.get(path).cloned()
    }

    fn short_path(&self, path: &str) -> Option<String> {
        self.short_paths.then(|| format!("{path}~1"))
    }
}

/// Shared record of load and unload events, in order
pub type Events = Rc<RefCell<Vec<String>>>;

pub struct FakeModule {
    name: String,
    symbols: HashMap<String, EntryFn>,
    events: Events,
}

impl LoadedModule for FakeModule {
    fn entry(&self, symbol: &str) -> Option<EntryFn> {
        self.symbols.get(symbol).copied()
    }
}

impl Drop for FakeModule {
    fn drop(&mut self) {
        self.events.borrow_mut().push(format!("unload {}", self.name));
    }
}

/// Loader that knows a fixed set of modules and their exports
#[derive(Default)]
pub struct FakeLoader {
    modules: HashMap<String, Vec<(String, EntryFn)>>,
    pub events: Events,
}

impl FakeLoader {
    pub fn with_module(mut self, name: &str, symbols: &[(&str, EntryFn)]) -> Self {
        let symbols = symbols
            .iter()
            .map(|(symbol, entry)| (symbol.to_string(), *entry))
            .collect();
        self.modules.insert(name.to_string(), symbols);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl ModuleLoader for FakeLoader {
    type Module = FakeModule;

    fn load(&self, name: &str) -> io::Result<FakeModule> {
        self.events.borrow_mut().push(format!("load {name}"));
        let symbols = self
            .modules
            .get(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "The specified module could not be found."))?;
        Ok(FakeModule {
            name: name.to_string(),
            symbols: symbols.iter().cloned().collect(),
            events: Rc::clone(&self.events),
        })
    }
}

/// Console that records what it was asked to do
#[derive(Default)]
pub struct FakeConsole {
    pub shown: usize,
    pub title: Option<OsString>,
    pub reports: Vec<String>,
    pub pauses: usize,
    /// Loader events as they stood when each report was made
    pub events_at_report: Vec<Vec<String>>,
    pub events: Events,
}

impl FakeConsole {
    pub fn watching(events: &Events) -> Self {
        Self {
            events: Rc::clone(events),
            ..Default::default()
        }
    }
}

impl Console for FakeConsole {
    fn show(&mut self) {
        self.shown += 1;
    }

    fn set_title(&mut self, title: &OsStr) {
        self.title = Some(title.to_os_string());
    }

    fn report(&mut self, message: &str) {
        self.show();
        self.reports.push(message.to_string());
        self.events_at_report.push(self.events.borrow().clone());
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }
}

pub fn dir_string(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

/// Write a launch script naming `module` into `dir` and return its path
pub fn write_script(dir: &Path, module: &str) -> String {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join("Launch.lua");
    fs::write(&path, format!("#@ {module}\r\nlaunch:OnInit()\n")).unwrap();
    dir_string(&path)
}

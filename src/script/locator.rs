//! Launch script discovery
//!
//! An explicit script argument wins. Otherwise each search root is tried in
//! turn, and within a root the script may sit directly in it, in its `src`
//! subdirectory, or, for a `runtime` directory of a source checkout, in the
//! sibling `src` directory. The first valid script found is inserted into the
//! command line as argument 1.

use std::ffi::OsStr;
use std::path::{Path, MAIN_SEPARATOR};

use crate::cli::CommandLine;
use crate::config::LauncherConfig;
use crate::platform::Host;
use crate::script::validator::{validate, Directive};

const SEPARATOR: char = MAIN_SEPARATOR;
// Windows accepts both; a backslash is an ordinary file name byte elsewhere
const ALT_SEPARATOR: Option<char> = if cfg!(windows) { Some('/') } else { None };

/// A validated script and its directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedScript {
    pub path: String,
    pub directive: Directive,
}

/// Places an installed script may live, in search order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRoot {
    ExecutableDir,
    InstallerRecord,
    RoamingAppData,
    CommonAppData,
}

impl SearchRoot {
    pub const ALL: [SearchRoot; 4] = [
        SearchRoot::ExecutableDir,
        SearchRoot::InstallerRecord,
        SearchRoot::RoamingAppData,
        SearchRoot::CommonAppData,
    ];
}

impl std::fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchRoot::ExecutableDir => "executable directory",
            SearchRoot::InstallerRecord => "installer record",
            SearchRoot::RoamingAppData => "roaming app data",
            SearchRoot::CommonAppData => "common app data",
        };
        write!(f, "{}", name)
    }
}

/// Unify separators and drop one trailing separator
pub fn normalize_base(base: &str) -> String {
    let mut base = match ALT_SEPARATOR {
        Some(alt) => base.replace(alt, &SEPARATOR.to_string()),
        None => base.to_string(),
    };
    if base.ends_with(SEPARATOR) {
        base.pop();
    }
    base
}

/// `C:\...` style absolute path
fn has_drive_prefix(path: &OsStr) -> bool {
    let Some(path) = path.to_str() else {
        return false;
    };
    let bytes = path.as_bytes();
    bytes.len() > 3
        && bytes[0].is_ascii_uppercase()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

pub struct ScriptLocator<'a, H: Host + ?Sized> {
    config: &'a LauncherConfig,
    host: &'a H,
}

impl<'a, H: Host + ?Sized> ScriptLocator<'a, H> {
    pub fn new(config: &'a LauncherConfig, host: &'a H) -> Self {
        Self { config, host }
    }

    /// Paths tried under `base`, in order
    pub fn candidates(&self, base: &str) -> Vec<String> {
        let base = normalize_base(base);
        let script = &self.config.script_name;
        let source = &self.config.source_dir;

        let mut candidates = vec![
            format!("{base}{SEPARATOR}{script}"),
            format!("{base}{SEPARATOR}{source}{SEPARATOR}{script}"),
        ];

        // <checkout>\runtime holds the binaries, the scripts are in <checkout>\src
        let runtime = &self.config.runtime_dir;
        if base.len() > runtime.len() + 1 {
            if let Some(last) = base.rfind(SEPARATOR) {
                if base[last + 1..].to_lowercase() == runtime.to_lowercase() {
                    let parent = &base[..last];
                    candidates.push(format!("{parent}{SEPARATOR}{source}{SEPARATOR}{script}"));
                }
            }
        }

        candidates
    }

    /// First valid script under `base`
    pub fn locate(&self, base: &str) -> Option<LocatedScript> {
        self.candidates(base).into_iter().find_map(|path| {
            tracing::trace!("trying {}", path);
            validate(Path::new(&path)).map(|directive| LocatedScript { path, directive })
        })
    }

    /// Base directory for a search root, if the system has one
    pub fn root(&self, root: SearchRoot) -> Option<String> {
        let base = match root {
            SearchRoot::ExecutableDir => self.host.executable_dir(),
            SearchRoot::InstallerRecord => self
                .host
                .installer_location(&self.config.installer_key, &self.config.installer_value),
            SearchRoot::RoamingAppData => self
                .host
                .roaming_app_data()
                .map(|dir| format!("{dir}{SEPARATOR}{}{SEPARATOR}", self.config.roaming_subdir)),
            SearchRoot::CommonAppData => self
                .host
                .common_app_data()
                .map(|dir| format!("{dir}{SEPARATOR}{}{SEPARATOR}", self.config.common_subdir)),
        };
        base.filter(|base| !base.is_empty())
    }

    /// Make sure argument 1 of `command_line` is a valid script
    ///
    /// Returns the script's directive, or `None` when no script exists
    /// anywhere in the search order.
    pub fn resolve(&self, command_line: &mut CommandLine) -> Option<Directive> {
        if let Some(directive) = self.explicit_script(command_line) {
            return Some(directive);
        }

        let found = SearchRoot::ALL.into_iter().find_map(|root| {
            let base = self.root(root)?;
            tracing::debug!("searching {} ({})", root, base);
            let script = self.locate(&base)?;
            let path = self.insertion_path(&script.path)?;
            Some((path, script.directive))
        });

        let (path, directive) = found?;
        tracing::info!("found launch script {}", path);
        command_line.insert_script(path);
        Some(directive)
    }

    fn explicit_script(&self, command_line: &mut CommandLine) -> Option<Directive> {
        let script = command_line.script()?;
        let directive = validate(Path::new(script))?;

        if has_drive_prefix(script) {
            if let Some(long) = self.host.long_path(script) {
                command_line.set_script(long);
            }
        }
        tracing::info!(
            "using launch script from the command line: {}",
            command_line.script().unwrap_or_default().to_string_lossy()
        );
        Some(directive)
    }

    fn insertion_path(&self, path: &str) -> Option<String> {
        if !self.config.short_paths {
            return Some(path.to_string());
        }
        let short = self.host.short_path(path);
        if short.is_none() {
            tracing::warn!("no short path for {}", path);
        }
        short
    }
}

//! The process command line
//!
//! Index 0 is the launcher itself, index 1 the script once one is known.

use std::ffi::{OsStr, OsString};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments the process was started with
    pub fn from_env() -> Self {
        Self::new(std::env::args_os())
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The script argument, if the command line has one
    pub fn script(&self) -> Option<&OsStr> {
        self.args.get(1).map(OsString::as_os_str)
    }

    /// Replace the script argument in place
    pub fn set_script(&mut self, path: impl Into<OsString>) {
        if let Some(slot) = self.args.get_mut(1) {
            *slot = path.into();
        }
    }

    /// Insert a script right after the launcher path, shifting the rest
    pub fn insert_script(&mut self, path: impl Into<OsString>) {
        let index = self.args.len().min(1);
        self.args.insert(index, path.into());
    }
}

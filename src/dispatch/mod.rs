//! Loading the module and handing it the command line

pub mod entry;
pub mod launcher;
pub mod marshal;

pub use entry::EntryPoint;
pub use launcher::{is_dev_script, Launcher, FAILURE_STATUS};
pub use marshal::{marshal, marshal_with, ArgumentBlock};

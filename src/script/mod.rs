//! Launch script handling
//!
//! Finds the startup script and reads the module name from its first line.

pub mod locator;
pub mod validator;

pub use locator::{normalize_base, LocatedScript, ScriptLocator, SearchRoot};
pub use validator::{parse_header, validate, Directive, HEADER_LEN, MARKER};

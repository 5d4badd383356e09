//! Launch script validation
//!
//! A launch script announces the module that runs it on its first line:
//!
//! ```text
//! #@ SimpleGraphic
//! ```
//!
//! The line may follow a UTF-8 byte-order mark and must end within the first
//! [`HEADER_LEN`] bytes of the file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::text::{decode_narrow, trim_end, trim_in_place};

/// Marker that opens the directive line
pub const MARKER: &[u8; 2] = b"#@";

/// Bytes of the file inspected for the directive line
pub const HEADER_LEN: usize = 255;

const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";

/// The directive line of a valid script, without its marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive(String);

impl Directive {
    pub fn new(text: impl Into<String>) -> Self {
        Directive(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the module this directive names
    ///
    /// `suffix` is appended unless the name already ends with it, so `lua`
    /// and `lua.dll` both give `lua.dll`.
    pub fn module_name(&self, suffix: &str) -> String {
        let mut name = self.0.clone();
        trim_in_place(&mut name);
        if !ends_with_ignore_case(&name, suffix) {
            name.push_str(suffix);
        }
        name
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.as_bytes()[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

/// Check that `path` is a launch script and return its directive
///
/// Any failure, from a missing file to a malformed header, yields `None`.
pub fn validate(path: &Path) -> Option<Directive> {
    let header = match read_header(path) {
        Ok(header) => header,
        Err(e) => {
            tracing::trace!("{}: {}", path.display(), e);
            return None;
        }
    };
    let directive = parse_header(&header);
    if directive.is_none() {
        tracing::debug!("{}: no #@ directive in the first {} bytes", path.display(), HEADER_LEN);
    }
    directive
}

fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    Ok(header)
}

/// Extract the directive from the leading bytes of a file
pub fn parse_header(header: &[u8]) -> Option<Directive> {
    let header = &header[..header.len().min(HEADER_LEN)];
    // The header is treated as a C string
    let header = header.split(|&b| b == 0).next().unwrap_or_default();
    let header = header.strip_prefix(UTF8_BOM).unwrap_or(header);

    let line = header.strip_prefix(MARKER)?;
    let newline = line.iter().position(|&b| b == b'\n')?;
    let text = trim_end(&line[..newline]);
    Some(Directive(decode_narrow(text)))
}

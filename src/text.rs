//! Whitespace trimming for narrow and wide text buffers
//!
//! Narrow text is a byte string in the active code page, wide text is UTF-16
//! as handed out by the Windows registry and shell APIs. Both families use the
//! C-locale notion of whitespace.

/// C-locale `isspace` for a single byte
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// C-locale `iswspace` for a UTF-16 code unit
pub fn is_wide_space(c: u16) -> bool {
    u8::try_from(c).map_or(false, is_space)
}

/// Strip trailing whitespace from a narrow buffer
pub fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Strip leading and trailing whitespace from a narrow buffer
pub fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    trim_end(&bytes[start..])
}

/// Strip leading and trailing whitespace from a wide buffer
pub fn trim_wide(text: &[u16]) -> &[u16] {
    let start = text.iter().position(|&c| !is_wide_space(c)).unwrap_or(text.len());
    let text = &text[start..];
    let end = text.iter().rposition(|&c| !is_wide_space(c)).map_or(0, |i| i + 1);
    &text[..end]
}

/// Installer paths may be recorded as `"C:\\..."`: trim, then drop a quote from either end
pub fn strip_quotes_wide(text: &[u16]) -> &[u16] {
    let quote = u16::from(b'"');
    let text = trim_wide(text);
    let text = text.strip_prefix(&[quote]).unwrap_or(text);
    text.strip_suffix(&[quote]).unwrap_or(text)
}

/// Narrow text as a `String`
///
/// Valid UTF-8 is taken as is. Anything else is widened byte by byte, so a
/// code-page name keeps one character per byte instead of turning into
/// replacement characters.
pub fn decode_narrow(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Trim a `String` in place
pub fn trim_in_place(s: &mut String) {
    let end = trim_end(s.as_bytes()).len();
    s.truncate(end);
    let start = s.len() - trim(s.as_bytes()).len();
    s.drain(..start);
}

//! Argument marshalling for the module entry point
//!
//! Modules take `argc`/`argv` in the process's narrow code page, not UTF-8.

use std::ffi::{c_char, c_int, OsStr, OsString};

use crate::platform::to_narrow;

/// Convert every argument to the active narrow encoding
pub fn marshal(args: &[OsString]) -> Vec<Vec<u8>> {
    marshal_with(args, to_narrow)
}

/// Convert every argument with `convert`
///
/// An argument that fails to convert, or converts to text with an embedded
/// NUL, becomes empty; its neighbours are unaffected.
pub fn marshal_with<F>(args: &[OsString], convert: F) -> Vec<Vec<u8>>
where
    F: Fn(&OsStr) -> Option<Vec<u8>>,
{
    args.iter()
        .map(|arg| match convert(arg.as_os_str()) {
            Some(bytes) if !bytes.contains(&0) => bytes,
            _ => {
                tracing::warn!("argument {:?} has no narrow form, passing it empty", arg);
                Vec::new()
            }
        })
        .collect()
}

/// Narrow arguments packed into one buffer, with a C `argv` pointing into it
#[derive(Debug)]
pub struct ArgumentBlock {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
    pointers: Vec<*mut c_char>,
}

impl ArgumentBlock {
    pub fn pack<I>(args: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut buffer: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        for arg in args {
            offsets.push(buffer.len());
            buffer.extend_from_slice(&arg);
            buffer.push(0);
        }

        // The heap allocation never moves once packing is done
        let base = buffer.as_mut_ptr();
        let pointers = offsets
            .iter()
            .map(|&offset| unsafe { base.add(offset) }.cast::<c_char>())
            .chain(std::iter::once(std::ptr::null_mut()))
            .collect();

        Self {
            buffer,
            offsets,
            pointers,
        }
    }

    pub fn argc(&self) -> c_int {
        c_int::try_from(self.offsets.len()).unwrap_or(c_int::MAX)
    }

    /// NULL-terminated pointer array, valid while `self` is alive
    pub fn argv(&mut self) -> *mut *mut c_char {
        self.pointers.as_mut_ptr()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Argument `index` without its terminator
    #[cfg(test)]
    fn get(&self, index: usize) -> Option<&[u8]> {
        let start = *self.offsets.get(index)?;
        let end = start + self.buffer[start..].iter().position(|&b| b == 0)?;
        Some(&self.buffer[start..end])
    }
}

//! Windows backend: registry, shell folders, `LoadLibraryW` and an on-demand console

use std::ffi::{CString, OsStr, OsString};
use std::io::{self, BufRead, Write};
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::ptr;

use windows_sys::Win32::Foundation::{ERROR_SUCCESS, HMODULE, MAX_PATH};
use windows_sys::Win32::Globalization::{WideCharToMultiByte, CP_ACP};
use windows_sys::Win32::Storage::FileSystem::{GetLongPathNameW, GetShortPathNameW};
use windows_sys::Win32::System::Console::{AllocConsole, SetConsoleTitleW};
use windows_sys::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryW};
use windows_sys::Win32::System::Registry::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_SZ};
use windows_sys::Win32::UI::Shell::{SHGetSpecialFolderPathW, CSIDL_COMMON_APPDATA};

use super::{Console, EntryFn, Host, LoadedModule, ModuleLoader};
use crate::text::strip_quotes_wide;

/// NUL-terminated UTF-16 copy of `s`
fn wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(std::iter::once(0)).collect()
}

/// Text up to the first NUL
fn until_nul(buf: &[u16]) -> &[u16] {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    &buf[..len]
}

/// Convert to the active ANSI code page
pub fn to_narrow(arg: &OsStr) -> Option<Vec<u8>> {
    let units: Vec<u16> = arg.encode_wide().collect();
    if units.is_empty() {
        return Some(Vec::new());
    }
    let len = i32::try_from(units.len()).ok()?;
    let size = unsafe {
        WideCharToMultiByte(CP_ACP, 0, units.as_ptr(), len, ptr::null_mut(), 0, ptr::null(), ptr::null_mut())
    };
    if size <= 0 {
        return None;
    }
    let mut out = vec![0u8; size as usize];
    let written = unsafe {
        WideCharToMultiByte(CP_ACP, 0, units.as_ptr(), len, out.as_mut_ptr(), size, ptr::null(), ptr::null_mut())
    };
    if written <= 0 {
        return None;
    }
    out.truncate(written as usize);
    Some(out)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

impl Host for NativeHost {
    fn executable_dir(&self) -> Option<String> {
        super::current_exe_dir()
    }

    fn installer_location(&self, key: &str, value: &str) -> Option<String> {
        let key = wide(OsStr::new(key));
        let value = wide(OsStr::new(value));
        let mut buf = [0u16; MAX_PATH as usize];
        let mut size = std::mem::size_of_val(&buf) as u32;
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                key.as_ptr(),
                value.as_ptr(),
                RRF_RT_REG_SZ,
                ptr::null_mut(),
                buf.as_mut_ptr().cast(),
                &mut size,
            )
        };
        if status != ERROR_SUCCESS || size as usize <= std::mem::size_of::<u16>() {
            return None;
        }
        let units = size as usize / std::mem::size_of::<u16>();
        let text = strip_quotes_wide(until_nul(&buf[..units.min(buf.len())]));
        String::from_utf16(text).ok()
    }

    fn roaming_app_data(&self) -> Option<String> {
        super::roaming_dir()
    }

    fn common_app_data(&self) -> Option<String> {
        let mut buf = [0u16; MAX_PATH as usize];
        let ok = unsafe { SHGetSpecialFolderPathW(ptr::null_mut(), buf.as_mut_ptr(), CSIDL_COMMON_APPDATA as i32, 0) };
        if ok == 0 {
            return None;
        }
        String::from_utf16(until_nul(&buf)).ok()
    }

    fn long_path(&self, path: &OsStr) -> Option<OsString> {
        let path = wide(path);
        let mut buf = [0u16; MAX_PATH as usize];
        let len = unsafe { GetLongPathNameW(path.as_ptr(), buf.as_mut_ptr(), MAX_PATH) };
        if len == 0 || len > MAX_PATH {
            return None;
        }
        Some(OsString::from_wide(&buf[..len as usize]))
    }

    fn short_path(&self, path: &str) -> Option<String> {
        let path = wide(OsStr::new(path));
        let required = unsafe { GetShortPathNameW(path.as_ptr(), ptr::null_mut(), 0) };
        if required == 0 {
            return None;
        }
        let mut buf = vec![0u16; required as usize];
        let len = unsafe { GetShortPathNameW(path.as_ptr(), buf.as_mut_ptr(), required) };
        if len == 0 || len >= required {
            return None;
        }
        String::from_utf16(&buf[..len as usize]).ok()
    }
}

/// A module loaded with `LoadLibraryW`
#[derive(Debug)]
pub struct Library {
    handle: HMODULE,
}

impl Library {
    pub fn open(name: &OsStr) -> io::Result<Self> {
        let name = wide(name);
        let handle = unsafe { LoadLibraryW(name.as_ptr()) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { handle })
    }

    /// Unload the module; later calls do nothing
    pub fn release(&mut self) {
        if !self.handle.is_null() {
            unsafe { FreeLibrary(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        self.release();
    }
}

impl LoadedModule for Library {
    fn entry(&self, symbol: &str) -> Option<EntryFn> {
        if self.handle.is_null() {
            return None;
        }
        let symbol = CString::new(symbol).ok()?;
        let address = unsafe { GetProcAddress(self.handle, symbol.as_ptr().cast()) }?;
        Some(unsafe { std::mem::transmute::<unsafe extern "system" fn() -> isize, EntryFn>(address) })
    }
}

/// Uses the default DLL search order, which starts at the executable's directory
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    type Module = Library;

    fn load(&self, name: &str) -> io::Result<Library> {
        Library::open(OsStr::new(name))
    }
}

/// Console allocated the first time it is needed
#[derive(Debug, Default)]
pub struct NativeConsole {
    allocated: bool,
}

impl Console for NativeConsole {
    fn show(&mut self) {
        if self.allocated {
            return;
        }
        // Fails harmlessly when the process already has a console
        unsafe { AllocConsole() };
        self.allocated = true;
    }

    fn set_title(&mut self, title: &OsStr) {
        let title = wide(title);
        unsafe { SetConsoleTitleW(title.as_ptr()) };
    }

    fn report(&mut self, message: &str) {
        self.show();
        eprintln!("ERROR: {}", message);
    }

    fn pause(&mut self) {
        self.show();
        print!("Press Enter to continue . . . ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }
}

//! Unix backend: `dlopen` for modules, the controlling terminal as console

use std::ffi::{c_void, CStr, CString, OsStr, OsString};
use std::io::{self, BufRead, IsTerminal, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::{Console, EntryFn, Host, LoadedModule, ModuleLoader};

/// Machine-wide data folder standing in for `%PROGRAMDATA%`
const COMMON_DATA_DIR: &str = "/usr/local/share";

/// Arguments are already bytes in the locale encoding
pub fn to_narrow(arg: &OsStr) -> Option<Vec<u8>> {
    Some(arg.as_bytes().to_vec())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

impl Host for NativeHost {
    fn executable_dir(&self) -> Option<String> {
        super::current_exe_dir()
    }

    fn installer_location(&self, _key: &str, _value: &str) -> Option<String> {
        None
    }

    fn roaming_app_data(&self) -> Option<String> {
        super::roaming_dir()
    }

    fn common_app_data(&self) -> Option<String> {
        Some(COMMON_DATA_DIR.to_string())
    }

    fn long_path(&self, _path: &OsStr) -> Option<OsString> {
        None
    }

    fn short_path(&self, path: &str) -> Option<String> {
        Some(path.to_string())
    }
}

/// A module opened with `dlopen`
#[derive(Debug)]
pub struct Library {
    handle: *mut c_void,
}

impl Library {
    pub fn open(path: &OsStr) -> io::Result<Self> {
        let name = CString::new(path.as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(io::Error::new(io::ErrorKind::NotFound, last_dl_error()));
        }
        Ok(Self { handle })
    }

    /// Unload the module; later calls do nothing
    pub fn release(&mut self) {
        if !self.handle.is_null() {
            unsafe { libc::dlclose(self.handle) };
            self.handle = std::ptr::null_mut();
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
        let address = unsafe { libc::dlsym(self.handle, symbol.as_ptr()) };
        if address.is_null() {
            return None;
        }
        Some(unsafe { std::mem::transmute::<*mut c_void, EntryFn>(address) })
    }
}

fn last_dl_error() -> String {
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        return "unknown dlopen failure".to_string();
    }
    unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned()
}

/// Loads modules next to the executable first, then from the linker path
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    type Module = Library;

    fn load(&self, name: &str) -> io::Result<Library> {
        if !name.contains('/') {
            if let Some(dir) = super::current_exe_dir() {
                let local = Path::new(&dir).join(name);
                if local.is_file() {
                    return Library::open(local.as_os_str());
                }
            }
        }
        Library::open(OsStr::new(name))
    }
}

/// Writes to the terminal the launcher was started from
#[derive(Debug, Default)]
pub struct NativeConsole;

impl Console for NativeConsole {
    fn show(&mut self) {}

    fn set_title(&mut self, title: &OsStr) {
        tracing::debug!("console title: {}", title.to_string_lossy());
    }

    fn report(&mut self, message: &str) {
        eprintln!("ERROR: {}", message);
    }

    fn pause(&mut self) {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return;
        }
        print!("Press Enter to continue . . . ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        let _ = stdin.lock().read_line(&mut line);
    }
}

//! Executable discovery.
//!
//! The completion server is a Python 2.7 program, so the plugin has to find
//! an interpreter before it can launch it. Lookup order for
//! [`path_to_python`]:
//! 1. `path_to_python_27` from [`Settings`]
//! 2. `C:\python27\python.exe` on Windows, if present
//! 3. the first of `python_candidates` found on `PATH`

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};
use crate::settings::Settings;

pub const WIN_PYTHON27_PATH: &str = r"C:\python27\python.exe";

pub fn on_windows() -> bool {
    cfg!(windows)
}

/// Append the platform executable suffix (`.exe` on Windows) unless the
/// name already ends with it.
fn with_exe_suffix(name: &Path) -> PathBuf {
    let suffix = std::env::consts::EXE_SUFFIX;
    let Some(ext) = suffix.strip_prefix('.') else {
        return name.to_path_buf();
    };
    if name
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    {
        return name.to_path_buf();
    }
    let mut with_suffix = name.as_os_str().to_os_string();
    with_suffix.push(suffix);
    PathBuf::from(with_suffix)
}

/// Resolve `name` to an executable path.
///
/// A name that already points at an existing file (relative to the working
/// directory, or absolute) is returned unchanged. Otherwise each directory of
/// `search_path` is tried in order; `None` means the process `PATH`.
///
/// Search-path hits must also be executable: on Unix a file without an
/// execute bit is skipped there, even though it would be accepted when given
/// by path.
pub fn find_executable(name: impl AsRef<Path>, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let executable = with_exe_suffix(name.as_ref());
    if executable.is_file() {
        tracing::trace!(path = %executable.display(), "executable found as given");
        return Some(executable);
    }

    let paths: OsString = match search_path {
        Some(p) => p.to_os_string(),
        None => std::env::var_os("PATH")?,
    };
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    match which::which_in(&executable, Some(paths), cwd) {
        Ok(path) => {
            tracing::trace!(path = %path.display(), "executable found on search path");
            Some(path)
        }
        Err(e) => {
            tracing::trace!(name = %executable.display(), error = %e, "executable not found");
            None
        }
    }
}

/// Return the first of `names` that resolves via [`find_executable`].
pub fn path_to_first_existing_executable<S: AsRef<str>>(
    names: &[S],
    search_path: Option<&OsStr>,
) -> Option<PathBuf> {
    names
        .iter()
        .find_map(|name| find_executable(name.as_ref(), search_path))
}

/// Locate the Python 2.7 interpreter used to run the completion server.
pub fn path_to_python(settings: &Settings) -> Result<PathBuf> {
    path_to_python_in(settings, None)
}

/// [`path_to_python`] against an explicit search path.
pub fn path_to_python_in(settings: &Settings, search_path: Option<&OsStr>) -> Result<PathBuf> {
    if let Some(path) = &settings.path_to_python_27 {
        tracing::debug!(path = %path.display(), "using configured python");
        return Ok(path.clone());
    }

    if on_windows() {
        let fallback = Path::new(WIN_PYTHON27_PATH);
        if fallback.exists() {
            return Ok(fallback.to_path_buf());
        }
    }

    path_to_first_existing_executable(settings.python_candidates.as_slice(), search_path)
        .ok_or_else(|| BridgeError::PythonNotFound {
            candidates: settings.python_candidates.clone(),
        })
}

//! Ad hoc artifact hook for procedures
//!
//! While a procedure runs inside [`RunStore::create`](crate::RunStore::create),
//! the folder of the run being produced is published in a thread-local slot.
//! [`open`] resolves file names against `<run>/data/` through that slot, so
//! code deep inside a procedure can persist extra artifacts without threading
//! the run folder through every call.
//!
//! The slot is invocation-local: [`ContextGuard`] installs it right before the
//! procedure is called and restores the previous value when dropped, on every
//! exit path including unwinding. Nested `create` calls stack correctly.
//!
//! ```rust
//! use trueno_runs::context::{self, OpenMode};
//!
//! // Outside a run there is nothing to write into.
//! assert!(context::open("trace.csv", OpenMode::Write).is_err());
//! ```

use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Sub-folder of a run that receives files opened through the hook.
pub const DATA_DIR: &str = "data";

thread_local! {
    static ACTIVE_RUN: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

/// How [`open`] opens its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Read an existing file.
    #[default]
    Read,
    /// Create or truncate, then write.
    Write,
    /// Create if missing, then append.
    Append,
    /// Create; fail if the file already exists.
    CreateNew,
    /// Read and write an existing file without truncating.
    ReadWrite,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Read => options.read(true),
            Self::Write => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::CreateNew => options.write(true).create_new(true),
            Self::ReadWrite => options.read(true).write(true),
        };
        options
    }
}

/// Scope guard that publishes a run folder for the current thread.
#[derive(Debug)]
#[must_use = "the run context is cleared as soon as the guard is dropped"]
pub(crate) struct ContextGuard {
    previous: Option<PathBuf>,
}

impl ContextGuard {
    pub(crate) fn enter(folder: &Path) -> Self {
        let previous = ACTIVE_RUN.with(|slot| slot.replace(Some(folder.to_path_buf())));
        Self { previous }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_RUN.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Folder of the run whose procedure is executing on this thread, if any.
#[must_use]
pub fn active_run() -> Option<PathBuf> {
    ACTIVE_RUN.with(|slot| slot.borrow().clone())
}

/// `<run>/data/` of the active run, created on first use.
///
/// # Errors
///
/// Returns [`Error::NoActiveContext`] outside a procedure and [`Error::Io`] if
/// the folder cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let run = active_run().ok_or(Error::NoActiveContext)?;
    let dir = run.join(DATA_DIR);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open `name` under the active run's `data/` folder.
///
/// # Errors
///
/// Returns [`Error::NoActiveContext`] outside a procedure and [`Error::Io`] if
/// the file cannot be opened in `mode`.
pub fn open(name: impl AsRef<Path>, mode: OpenMode) -> Result<File> {
    let path = data_dir()?.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(mode.options().open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[test]
    fn test_open_without_context_fails() {
        let err = open("x.txt", OpenMode::Write).unwrap_err();
        assert!(matches!(err, Error::NoActiveContext));
        assert!(active_run().is_none());
    }

    #[test]
    fn test_guard_scopes_context() {
        let dir = TempDir::new().unwrap();
        {
            let _guard = ContextGuard::enter(dir.path());
            assert_eq!(active_run().as_deref(), Some(dir.path()));

            let mut file = open("notes.txt", OpenMode::Write).unwrap();
            file.write_all(b"hello").unwrap();
        }
        assert!(active_run().is_none());

        let written = fs::read_to_string(dir.path().join("data/notes.txt")).unwrap();
        assert_eq!(written, "hello");
    }

    #[test]
    fn test_nested_guards_restore_outer() {
        let outer = TempDir::new().unwrap();
        let inner = TempDir::new().unwrap();

        let _outer_guard = ContextGuard::enter(outer.path());
        {
            let _inner_guard = ContextGuard::enter(inner.path());
            assert_eq!(active_run().as_deref(), Some(inner.path()));
        }
        assert_eq!(active_run().as_deref(), Some(outer.path()));
    }

    #[test]
    fn test_guard_clears_on_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let outcome = std::panic::catch_unwind(move || {
            let _guard = ContextGuard::enter(&path);
            panic!("procedure blew up");
        });

        assert!(outcome.is_err());
        assert!(active_run().is_none());
    }

    #[test]
    fn test_modes() {
        let dir = TempDir::new().unwrap();
        let _guard = ContextGuard::enter(dir.path());

        open("log.txt", OpenMode::Write).unwrap().write_all(b"a").unwrap();
        open("log.txt", OpenMode::Append).unwrap().write_all(b"b").unwrap();
        assert!(open("log.txt", OpenMode::CreateNew).is_err());

        let mut contents = String::new();
        open("log.txt", OpenMode::Read)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "ab");
    }
}

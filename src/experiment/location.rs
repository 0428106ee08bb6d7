//! Location - reference to a run folder

use std::path::{Path, PathBuf};

use crate::naming::check_folder_name;
use crate::Result;

/// Where to find a run.
///
/// A [`Location::Name`] is always joined onto the store folder and must be
/// a single plain folder name; a [`Location::Path`] is used as given. A bare
/// string converts to `Name` and is never retried as a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Folder name relative to the store folder.
    Name(String),
    /// Explicit path to the run folder.
    Path(PathBuf),
}

impl Location {
    /// Build from a command-line style pair: positional string plus
    /// `--absolute` flag.
    #[must_use]
    pub fn new(location: impl Into<String>, absolute: bool) -> Self {
        let location = location.into();
        if absolute {
            Self::Path(PathBuf::from(location))
        } else {
            Self::Name(location)
        }
    }

    /// Run folder name under the store folder.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Explicit run folder path.
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Resolve against the store folder.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`](crate::Error::InvalidName) if a name is empty,
    /// absolute, or contains a separator, `.` or `..`. Such a name would
    /// address something other than a child of the store folder.
    pub fn resolve(&self, store_folder: &Path) -> Result<PathBuf> {
        match self {
            Self::Name(name) => Ok(store_folder.join(check_folder_name(name)?)),
            Self::Path(path) => Ok(path.clone()),
        }
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Location {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

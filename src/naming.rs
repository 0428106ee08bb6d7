//! Folder naming: timestamped run folders and collision-free renames
//!
//! [`unique_path`] is check-then-create. Two writers resolving the same
//! desired name at once can both receive it; the store assumes a single
//! writer per root.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};

use crate::{Error, Result};

/// `strftime` pattern for run folder names.
///
/// Zero-padded, most significant field first, microsecond precision:
/// lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S%.6f";

/// Run folder name for the given instant, e.g. `2024-03-01 09-15-02.123456`.
#[must_use]
pub fn timestamp_name(instant: DateTime<Local>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Run folder name for the current instant.
#[must_use]
pub fn timestamp_now() -> String {
    timestamp_name(Local::now())
}

/// Check that `name` can only ever address a direct child of a folder.
///
/// Accepts one plain path component. Rejects the empty string, `.`, `..`,
/// roots, drive prefixes and anything containing a separator.
///
/// # Errors
///
/// [`Error::InvalidName`] if `name` is not a single plain component.
pub fn check_folder_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    );
    if single && !name.chars().any(std::path::is_separator) {
        Ok(name)
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Resolve `desired` to a path that does not exist yet.
///
/// Returns `desired` unchanged if it is free. Otherwise inserts ` (n)` before
/// the extension, counting up from 1 until a free name is found:
/// `x` becomes `x (1)`, `report.pdf` becomes `report (1).pdf`.
#[must_use]
pub fn unique_path(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let parent = desired.parent().unwrap_or_else(|| Path::new(""));
    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = desired
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let candidate = parent.join(format!("{stem} ({counter}){suffix}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

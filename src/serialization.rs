//! Blob persistence for run configurations and results
//!
//! Values are encoded with bincode over serde. Encoding is compact but not
//! self-describing, so shapes that rely on `deserialize_any` (for example
//! `serde_json::Value`) cannot be stored.
//!
//! A missing blob always surfaces as [`Error::NotFound`], never as
//! [`Error::Io`], so callers can tell "no result yet" apart from a broken
//! disk.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

/// File name of the configuration blob inside a run folder.
pub const CONFIG_FILE: &str = "config.bin";

/// File name of the result blob inside a run folder.
pub const RESULT_FILE: &str = "result.bin";

/// Write `value` to `path`, replacing any previous blob.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created or flushed and
/// [`Error::Encode`] if the value cannot be encoded.
pub fn dump<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value).map_err(|e| match *e {
        bincode::ErrorKind::Io(io) => Error::Io(io),
        other => Error::Encode(format!("{}: {other}", path.display())),
    })?;
    writer.flush()?;
    Ok(())
}

/// Read a value previously written by [`dump`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the blob is absent and [`Error::Decode`] if
/// its bytes do not decode to `T`.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::not_found(path)),
        Err(e) => return Err(Error::Io(e)),
    };
    bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| Error::Decode(format!("{}: {e}", path.display())))
}

/// Cheap existence check; never decodes.
#[must_use]
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Write the configuration blob into an existing run folder.
///
/// # Errors
///
/// See [`dump`].
pub fn dump_config<C: Serialize>(config: &C, folder: &Path) -> Result<()> {
    dump(config, &folder.join(CONFIG_FILE))
}

/// Write the result blob into an existing run folder.
///
/// # Errors
///
/// See [`dump`].
pub fn dump_result<R: Serialize>(result: &R, folder: &Path) -> Result<()> {
    dump(result, &folder.join(RESULT_FILE))
}

/// Load the configuration blob from a run folder.
///
/// # Errors
///
/// See [`load`].
pub fn load_config<C: DeserializeOwned>(folder: &Path) -> Result<C> {
    load(&folder.join(CONFIG_FILE))
}

/// Load the result blob from a run folder.
///
/// # Errors
///
/// See [`load`].
pub fn load_result<R: DeserializeOwned>(folder: &Path) -> Result<R> {
    load(&folder.join(RESULT_FILE))
}

/// Whether `folder` holds a configuration blob.
#[must_use]
pub fn has_config(folder: &Path) -> bool {
    exists(&folder.join(CONFIG_FILE))
}

/// Whether `folder` holds a result blob.
#[must_use]
pub fn has_result(folder: &Path) -> bool {
    exists(&folder.join(RESULT_FILE))
}

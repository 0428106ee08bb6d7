//! Run - a configuration, its result, and the folder they live in

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::RunStore;
use crate::naming::{check_folder_name, unique_path};
use crate::{Error, Result};

/// Sub-folder of a run holding one folder per plot call.
pub const PLOTS_DIR: &str = "plots";

/// Desired name of a plot-call folder before de-duplication.
pub const PLOT_FOLDER: &str = "plot";

/// Handle to one persisted run.
///
/// Borrowed from the [`RunStore`] that created or loaded it. Dropping the
/// handle leaves the folder untouched.
pub struct Run<'s, C, R> {
    config: C,
    result: R,
    location: PathBuf,
    store: &'s RunStore<C, R>,
}

impl<'s, C, R> Run<'s, C, R> {
    pub(crate) fn new(config: C, result: R, location: PathBuf, store: &'s RunStore<C, R>) -> Self {
        Self {
            config,
            result,
            location,
            store,
        }
    }

    /// Configuration the run was executed with.
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Result of the procedure.
    #[must_use]
    pub const fn result(&self) -> &R {
        &self.result
    }

    /// Folder of the run.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Folder name of the run. For timestamped folders this sorts
    /// chronologically.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.location.file_name().and_then(|name| name.to_str())
    }

    /// Store the run belongs to.
    #[must_use]
    pub const fn store(&self) -> &'s RunStore<C, R> {
        self.store
    }

    /// Take the configuration and result out of the handle.
    #[must_use]
    pub fn into_parts(self) -> (C, R) {
        (self.config, self.result)
    }

    /// Regenerate plots into a new folder under `<run>/plots/`.
    ///
    /// The folder is named `plot`, then `plot (1)`, `plot (2)`, ... so earlier
    /// plot calls are never overwritten. Returns the new folder.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the folder cannot be created, or any plotter error.
    pub fn plot(&self) -> Result<PathBuf> {
        let plots = self.location.join(PLOTS_DIR);
        fs::create_dir_all(&plots)?;

        let folder = unique_path(&plots.join(PLOT_FOLDER));
        fs::create_dir(&folder)?;

        self.store.plot(&self.config, &self.result, &folder)?;
        info!(folder = %folder.display(), plotters = self.store.plotters().len(), "plots written");
        Ok(folder)
    }

    /// Move the run folder to `name` next to it and point the handle there.
    ///
    /// An existing folder is never overwritten: `name` is de-duplicated to
    /// `name (1)`, `name (2)`, ... On error the handle and the folder are
    /// left as they were.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] unless `name` is a single plain folder name,
    /// [`Error::NotFound`] if the folder has no parent, [`Error::Io`] if the
    /// move fails.
    pub fn rename(&mut self, name: &str) -> Result<()> {
        let name = check_folder_name(name)?;
        let parent = self
            .location
            .parent()
            .ok_or_else(|| Error::not_found(&self.location))?;
        let destination = unique_path(&parent.join(name));

        fs::rename(&self.location, &destination)?;
        info!(from = %self.location.display(), to = %destination.display(), "run renamed");

        self.location = destination;
        Ok(())
    }
}

impl<'s, C, R> Run<'s, C, R>
where
    C: Clone + Serialize + DeserializeOwned,
    R: Serialize + DeserializeOwned,
{
    /// Execute the procedure again on this run's configuration.
    ///
    /// Always creates a new run folder; this run is only read.
    ///
    /// # Errors
    ///
    /// See [`RunStore::create`].
    pub fn reproduce(&self) -> Result<Run<'s, C, R>> {
        self.store.create(self.config.clone())
    }
}

impl<C: fmt::Debug, R: fmt::Debug> fmt::Debug for Run<'_, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("config", &self.config)
            .field("result", &self.result)
            .field("location", &self.location)
            .field("store", &self.store.name())
            .finish()
    }
}

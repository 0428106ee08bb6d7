//! Run Store - binds one procedure to one directory of runs
//!
//! Runs are created with a single blocking call: the procedure executes on
//! the caller's thread and nothing is scheduled in the background. The store
//! assumes one writer per folder; exclusive folder creation is the only
//! guard against a concurrent writer.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, ReadDir};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::{Location, Run};
use crate::context::ContextGuard;
use crate::plot::Plotter;
use crate::{naming, serialization, Error, Result};

type Procedure<C, R> = dyn Fn(&C) -> anyhow::Result<R>;

/// Directory-backed store of runs for one procedure.
///
/// Plotters and presets are registered while setting up, through
/// [`RunStoreBuilder`] or the `&mut self` registration methods, before any
/// run borrows the store.
pub struct RunStore<C, R> {
    procedure: Box<Procedure<C, R>>,
    directory: PathBuf,
    name: String,
    plotters: Vec<Plotter<C, R>>,
    presets: BTreeMap<String, C>,
}

impl<C, R> RunStore<C, R> {
    /// Create a store with no plotters or presets.
    ///
    /// Runs live under `<directory>/<name>/`. Nothing is created on disk
    /// until the first run.
    pub fn new(
        directory: impl Into<PathBuf>,
        name: impl Into<String>,
        procedure: impl Fn(&C) -> anyhow::Result<R> + 'static,
    ) -> Self {
        Self {
            procedure: Box::new(procedure),
            directory: directory.into(),
            name: name.into(),
            plotters: Vec::new(),
            presets: BTreeMap::new(),
        }
    }

    /// Create a builder for a store with plotters and presets.
    #[must_use]
    pub fn builder(
        directory: impl Into<PathBuf>,
        name: impl Into<String>,
        procedure: impl Fn(&C) -> anyhow::Result<R> + 'static,
    ) -> RunStoreBuilder<C, R> {
        RunStoreBuilder::new(directory, name, procedure)
    }

    /// Root directory shared by stores.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Store name, the sub-folder of [`directory`](Self::directory).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folder holding this store's runs.
    #[must_use]
    pub fn folder(&self) -> PathBuf {
        self.directory.join(&self.name)
    }

    /// Registered plotters in registration order.
    #[must_use]
    pub fn plotters(&self) -> &[Plotter<C, R>] {
        &self.plotters
    }

    /// Registered presets.
    #[must_use]
    pub const fn presets(&self) -> &BTreeMap<String, C> {
        &self.presets
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn preset(&self, name: &str) -> Option<&C> {
        self.presets.get(name)
    }

    /// Append plotters. They run after those already registered.
    pub fn register_plotters(&mut self, plotters: impl IntoIterator<Item = Plotter<C, R>>) {
        self.plotters.extend(plotters);
    }

    /// Append one plotter.
    pub fn register_plotter(&mut self, plotter: Plotter<C, R>) {
        self.plotters.push(plotter);
    }

    /// Register a preset. An existing preset with the same name is replaced.
    pub fn register_preset(&mut self, name: impl Into<String>, config: C) {
        self.presets.insert(name.into(), config);
    }

    /// Merge presets; later names overwrite earlier ones.
    pub fn register_presets<K: Into<String>>(&mut self, presets: impl IntoIterator<Item = (K, C)>) {
        self.presets
            .extend(presets.into_iter().map(|(name, config)| (name.into(), config)));
    }

    /// Resolve a location to a folder path.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for a name that would leave the store folder.
    pub fn locate(&self, location: &Location) -> Result<PathBuf> {
        location.resolve(&self.folder())
    }

    /// Whether the location holds both a config and a result blob.
    ///
    /// An invalid name is never contained.
    #[must_use]
    pub fn contains(&self, location: impl Into<Location>) -> bool {
        self.locate(&location.into())
            .is_ok_and(|folder| is_run_folder(&folder))
    }

    /// Run every registered plotter, in order, into `folder`.
    ///
    /// Artists sharing a name overwrite each other's output; the later
    /// plotter wins.
    ///
    /// # Errors
    ///
    /// Stops at the first failing plotter. See [`Plotter::render`].
    pub fn plot(&self, config: &C, result: &R, folder: &Path) -> Result<()> {
        for plotter in &self.plotters {
            plotter.render(config, result, folder)?;
        }
        Ok(())
    }

    fn make_folder(&self, name: &str) -> Result<PathBuf> {
        let base = self.folder();
        fs::create_dir_all(&base)?;

        let folder = base.join(naming::check_folder_name(name)?);
        match fs::create_dir(&folder) {
            Ok(()) => Ok(folder),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::Collision { path: folder }),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl<C, R> RunStore<C, R>
where
    C: Serialize + DeserializeOwned,
    R: Serialize + DeserializeOwned,
{
    /// Execute the procedure on `config` and persist the run.
    ///
    /// Steps, in order:
    /// 1. create a fresh timestamped folder; an existing folder with the same
    ///    name is a [`Error::Collision`], never retried under another name
    /// 2. write the configuration
    /// 3. call the procedure, with [`context`](crate::context) pointing at the
    ///    new folder
    /// 4. write the result
    /// 5. if plotters are registered, generate plots (see [`Run::plot`])
    ///
    /// # Errors
    ///
    /// A procedure failure is returned as [`Error::Procedure`] holding the
    /// procedure's own error. The folder is left in place with its
    /// configuration so the failed attempt can be inspected.
    pub fn create(&self, config: C) -> Result<Run<'_, C, R>> {
        self.create_in(&naming::timestamp_now(), config)
    }

    /// [`create`](Self::create) into the folder `name` under the store.
    pub(crate) fn create_in(&self, name: &str, config: C) -> Result<Run<'_, C, R>> {
        let folder = self.make_folder(name)?;
        info!(store = %self.name, folder = %folder.display(), "run folder created");

        serialization::dump_config(&config, &folder)?;

        let result = {
            let _context = ContextGuard::enter(&folder);
            debug!(store = %self.name, "invoking procedure");
            (self.procedure)(&config).map_err(Error::Procedure)?
        };
        debug!(store = %self.name, "procedure finished");

        serialization::dump_result(&result, &folder)?;

        let run = Run::new(config, result, folder, self);
        if !self.plotters.is_empty() {
            run.plot()?;
        }
        Ok(run)
    }

    /// Load the configuration stored at `location`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if there is no configuration blob.
    pub fn config(&self, location: impl Into<Location>) -> Result<C> {
        serialization::load_config(&self.locate(&location.into())?)
    }

    /// Load the result stored at `location`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if there is no result blob.
    pub fn result(&self, location: impl Into<Location>) -> Result<R> {
        serialization::load_result(&self.locate(&location.into())?)
    }

    /// Load the run at `location`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the location is not a folder or lacks either
    /// blob, [`Error::InvalidName`] for a name that would leave the store
    /// folder.
    pub fn lookup(&self, location: impl Into<Location>) -> Result<Run<'_, C, R>> {
        let folder = self.locate(&location.into())?;
        self.load(folder)
    }

    /// Lazily iterate over the runs in the store folder.
    ///
    /// Runs are loaded one at a time in directory order, which is
    /// platform-defined. Sort by [`Run::name`] for chronological order.
    /// Folders without both blobs are skipped. A store folder that does not
    /// exist yet yields nothing.
    #[must_use]
    pub fn iter(&self) -> Runs<'_, C, R> {
        Runs::new(self)
    }

    fn load(&self, folder: PathBuf) -> Result<Run<'_, C, R>> {
        if !folder.is_dir() {
            return Err(Error::not_found(folder));
        }
        let config = serialization::load_config(&folder)?;
        let result = serialization::load_result(&folder)?;
        Ok(Run::new(config, result, folder, self))
    }
}

impl<C, R> fmt::Debug for RunStore<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunStore")
            .field("directory", &self.directory)
            .field("name", &self.name)
            .field(
                "plotters",
                &self.plotters.iter().map(|p| p.artist().name()).collect::<Vec<_>>(),
            )
            .field("presets", &self.presets.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'a, C, R> IntoIterator for &'a RunStore<C, R>
where
    C: Serialize + DeserializeOwned,
    R: Serialize + DeserializeOwned,
{
    type Item = Result<Run<'a, C, R>>;
    type IntoIter = Runs<'a, C, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn is_run_folder(folder: &Path) -> bool {
    serialization::has_config(folder) && serialization::has_result(folder)
}

/// Lazy iterator over the runs of a [`RunStore`].
pub struct Runs<'a, C, R> {
    store: &'a RunStore<C, R>,
    entries: Option<ReadDir>,
    pending: Option<Error>,
}

impl<'a, C, R> Runs<'a, C, R> {
    fn new(store: &'a RunStore<C, R>) -> Self {
        match fs::read_dir(store.folder()) {
            Ok(entries) => Self {
                store,
                entries: Some(entries),
                pending: None,
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Self {
                store,
                entries: None,
                pending: None,
            },
            Err(e) => Self {
                store,
                entries: None,
                pending: Some(Error::Io(e)),
            },
        }
    }
}

impl<'a, C, R> Iterator for Runs<'a, C, R>
where
    C: Serialize + DeserializeOwned,
    R: Serialize + DeserializeOwned,
{
    type Item = Result<Run<'a, C, R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending.take() {
            return Some(Err(error));
        }

        let entries = self.entries.as_mut()?;
        for entry in entries.by_ref() {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(Error::Io(e))),
            };
            if !path.is_dir() {
                continue;
            }
            if !is_run_folder(&path) {
                trace!(folder = %path.display(), "skipping folder without config and result");
                continue;
            }
            return Some(self.store.load(path));
        }
        None
    }
}

/// Builder for [`RunStore`].
pub struct RunStoreBuilder<C, R> {
    store: RunStore<C, R>,
}

impl<C, R> RunStoreBuilder<C, R> {
    /// Create a new builder with required fields.
    pub fn new(
        directory: impl Into<PathBuf>,
        name: impl Into<String>,
        procedure: impl Fn(&C) -> anyhow::Result<R> + 'static,
    ) -> Self {
        Self {
            store: RunStore::new(directory, name, procedure),
        }
    }

    /// Append a plotter.
    #[must_use]
    pub fn plotter(mut self, plotter: Plotter<C, R>) -> Self {
        self.store.register_plotter(plotter);
        self
    }

    /// Append several plotters.
    #[must_use]
    pub fn plotters(mut self, plotters: impl IntoIterator<Item = Plotter<C, R>>) -> Self {
        self.store.register_plotters(plotters);
        self
    }

    /// Register a named preset (last registration wins).
    #[must_use]
    pub fn preset(mut self, name: impl Into<String>, config: C) -> Self {
        self.store.register_preset(name, config);
        self
    }

    /// Merge named presets (last registration wins).
    #[must_use]
    pub fn presets<K: Into<String>>(mut self, presets: impl IntoIterator<Item = (K, C)>) -> Self {
        self.store.register_presets(presets);
        self
    }

    /// Build the `RunStore`.
    #[must_use]
    pub fn build(self) -> RunStore<C, R> {
        self.store
    }
}

impl<C, R> fmt::Debug for RunStoreBuilder<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunStoreBuilder")
            .field("store", &self.store)
            .finish()
    }
}

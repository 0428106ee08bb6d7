//! Plot pipeline
//!
//! Drawing is delegated to user code. An [`Artist`] turns a run's
//! configuration and result into a [`Plot`]: one figure, or several figures
//! keyed by name. A [`Plotter`] wraps an artist with the policy for writing
//! those figures to disk.
//!
//! ## File layout
//!
//! ```text
//! <target>/
//!     <artist>.<format>              Plot::Single
//!     <artist>/<entry>.<format>      Plot::Many, one file per entry
//! ```
//!
//! ## Figure lifetime
//!
//! Figures are owned values. The plotter drops each one after saving it,
//! on success and on error alike, so backends that hold native resources
//! should release them in `Drop`.

mod plotter;

pub use plotter::{Plotter, DEFAULT_FORMAT};

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Backend-specific options forwarded to [`Figure::save`] (dpi, bbox, ...).
pub type SaveOptions = BTreeMap<String, serde_json::Value>;

/// A drawable figure produced by an artist.
pub trait Figure {
    /// Write the figure to `path`. The extension of `path` is the plotter's
    /// file format.
    ///
    /// # Errors
    ///
    /// Any backend failure.
    fn save(&self, path: &Path, options: &SaveOptions) -> anyhow::Result<()>;

    /// Display the figure interactively.
    ///
    /// Only called when the plotter was built with `.show(true)`. The default
    /// does nothing, which keeps headless runs from blocking.
    ///
    /// # Errors
    ///
    /// Any backend failure.
    fn show(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Output of one artist call.
pub enum Plot {
    /// One figure, saved as `<artist>.<format>`.
    Single(Box<dyn Figure>),
    /// Named figures, saved as `<artist>/<entry>.<format>` in name order.
    Many(BTreeMap<String, Box<dyn Figure>>),
}

impl Plot {
    /// Wrap a single figure.
    #[must_use]
    pub fn single(figure: impl Figure + 'static) -> Self {
        Self::Single(Box::new(figure))
    }

    /// Collect named figures. A repeated name keeps the last figure.
    #[must_use]
    pub fn many<I, K, F>(figures: I) -> Self
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Figure + 'static,
    {
        Self::Many(
            figures
                .into_iter()
                .map(|(name, figure)| (name.into(), Box::new(figure) as Box<dyn Figure>))
                .collect(),
        )
    }

    /// Number of figures held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(figures) => figures.len(),
        }
    }

    /// True for an empty mapping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Plot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Plot::Single"),
            Self::Many(figures) => f
                .debug_tuple("Plot::Many")
                .field(&figures.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

type Draw<C, R> = dyn Fn(&C, &R) -> anyhow::Result<Plot>;

/// Named drawing callback.
///
/// The name becomes the file stem (single figure) or sub-folder (mapping)
/// of everything the artist produces.
pub struct Artist<C, R> {
    name: String,
    draw: Box<Draw<C, R>>,
}

impl<C, R> Artist<C, R> {
    /// Create an artist.
    pub fn new(
        name: impl Into<String>,
        draw: impl Fn(&C, &R) -> anyhow::Result<Plot> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            draw: Box::new(draw),
        }
    }

    /// Artist name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callback.
    ///
    /// # Errors
    ///
    /// Whatever the callback returns.
    pub fn draw(&self, config: &C, result: &R) -> anyhow::Result<Plot> {
        (self.draw)(config, result)
    }
}

impl<C, R> fmt::Debug for Artist<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artist").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Figure whose bytes were rendered up front. Saving writes them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesFigure {
    bytes: Vec<u8>,
}

impl BytesFigure {
    /// Wrap pre-rendered bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The rendered bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Figure for BytesFigure {
    fn save(&self, path: &Path, _options: &SaveOptions) -> anyhow::Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

pub(crate) fn figure_path(folder: &Path, name: &str, format: &str) -> PathBuf {
    folder.join(format!("{name}.{format}"))
}

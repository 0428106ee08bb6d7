//! Plotter - writes an artist's figures into a plot folder

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{figure_path, Artist, Figure, Plot, SaveOptions};
use crate::{Error, Result};

/// Default file format for saved figures.
pub const DEFAULT_FORMAT: &str = "pdf";

/// An [`Artist`] plus the policy for writing its figures.
///
/// Plotters registered on one store all write into the same target folder
/// per plot call. Two artists with the same name overwrite each other's
/// files there; the later plotter wins.
#[derive(Debug)]
pub struct Plotter<C, R> {
    artist: Artist<C, R>,
    format: String,
    show: bool,
    options: SaveOptions,
}

impl<C, R> Plotter<C, R> {
    /// Create a plotter saving PDFs, with interactive display off.
    pub fn new(
        name: impl Into<String>,
        draw: impl Fn(&C, &R) -> anyhow::Result<Plot> + 'static,
    ) -> Self {
        Self::from_artist(Artist::new(name, draw))
    }

    /// Create a plotter around an existing artist.
    #[must_use]
    pub fn from_artist(artist: Artist<C, R>) -> Self {
        Self {
            artist,
            format: DEFAULT_FORMAT.to_string(),
            show: false,
            options: SaveOptions::new(),
        }
    }

    /// Set the file format (extension), e.g. `"svg"` or `"png"`.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Display each figure interactively after saving it.
    #[must_use]
    pub const fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Add a backend save option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// The wrapped artist.
    #[must_use]
    pub const fn artist(&self) -> &Artist<C, R> {
        &self.artist
    }

    /// File format of saved figures.
    #[must_use]
    pub fn file_format(&self) -> &str {
        &self.format
    }

    /// Whether figures are displayed interactively.
    #[must_use]
    pub const fn shows(&self) -> bool {
        self.show
    }

    /// Backend save options.
    #[must_use]
    pub const fn save_options(&self) -> &SaveOptions {
        &self.options
    }

    /// Draw and write this plotter's figures into `folder`.
    ///
    /// Returns the written files in write order.
    ///
    /// # Errors
    ///
    /// [`Error::Plot`] if the artist or a figure backend fails, [`Error::Io`]
    /// if the artist sub-folder cannot be created.
    pub fn render(&self, config: &C, result: &R, folder: &Path) -> Result<Vec<PathBuf>> {
        let name = self.artist.name();
        let plot = self
            .artist
            .draw(config, result)
            .map_err(|source| self.plot_error(source))?;

        match plot {
            Plot::Single(figure) => {
                let path = figure_path(folder, name, &self.format);
                self.write(figure, &path)?;
                Ok(vec![path])
            }
            Plot::Many(figures) => {
                let dir = folder.join(name);
                fs::create_dir_all(&dir)?;

                let mut written = Vec::with_capacity(figures.len());
                for (entry, figure) in figures {
                    let path = figure_path(&dir, &entry, &self.format);
                    self.write(figure, &path)?;
                    written.push(path);
                }
                Ok(written)
            }
        }
    }

    // Takes ownership so the figure is released as soon as this returns.
    fn write(&self, figure: Box<dyn Figure>, path: &Path) -> Result<()> {
        figure
            .save(path, &self.options)
            .map_err(|source| self.plot_error(source))?;
        debug!(artist = self.artist.name(), path = %path.display(), "figure saved");

        if self.show {
            figure.show().map_err(|source| self.plot_error(source))?;
        }
        Ok(())
    }

    fn plot_error(&self, source: anyhow::Error) -> Error {
        Error::Plot {
            artist: self.artist.name().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::BytesFigure;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Tracked {
        drops: Rc<Cell<usize>>,
        shows: Rc<Cell<usize>>,
        fail: bool,
    }

    impl Figure for Tracked {
        fn save(&self, path: &Path, _options: &SaveOptions) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("backend refused {}", path.display());
            }
            fs::write(path, b"fig")?;
            Ok(())
        }

        fn show(&self) -> anyhow::Result<()> {
            self.shows.set(self.shows.get() + 1);
            Ok(())
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn test_defaults() {
        let plotter: Plotter<(), ()> =
            Plotter::new("p", |_, _| Ok(Plot::single(BytesFigure::new(""))));
        assert_eq!(plotter.file_format(), "pdf");
        assert!(!plotter.shows());
        assert!(plotter.save_options().is_empty());
    }

    #[test]
    fn test_single_figure_written_flat() {
        let dir = TempDir::new().unwrap();
        let plotter: Plotter<u8, u8> =
            Plotter::new("curve", |_, _| Ok(Plot::single(BytesFigure::new("svg")))).format("svg");

        let written = plotter.render(&0, &0, dir.path()).unwrap();

        assert_eq!(written, vec![dir.path().join("curve.svg")]);
        assert_eq!(fs::read(dir.path().join("curve.svg")).unwrap(), b"svg");
    }

    #[test]
    fn test_mapping_written_into_artist_folder() {
        let dir = TempDir::new().unwrap();
        let plotter: Plotter<u8, u8> = Plotter::new("panels", |_, _| {
            Ok(Plot::many([
                ("a", BytesFigure::new("1")),
                ("b", BytesFigure::new("2")),
            ]))
        })
        .format("png");

        plotter.render(&0, &0, dir.path()).unwrap();

        assert!(dir.path().join("panels/a.png").is_file());
        assert!(dir.path().join("panels/b.png").is_file());
        assert!(!dir.path().join("panels.png").exists());
    }

    #[test]
    fn test_figures_released_even_when_save_fails() {
        let dir = TempDir::new().unwrap();
        let drops = Rc::new(Cell::new(0));
        let shows = Rc::new(Cell::new(0));
        let (d, s) = (Rc::clone(&drops), Rc::clone(&shows));

        let plotter: Plotter<u8, u8> = Plotter::new("broken", move |_, _| {
            Ok(Plot::many([
                ("a", Tracked { drops: Rc::clone(&d), shows: Rc::clone(&s), fail: true }),
                ("b", Tracked { drops: Rc::clone(&d), shows: Rc::clone(&s), fail: false }),
            ]))
        })
        .show(true);

        let err = plotter.render(&0, &0, dir.path()).unwrap_err();

        assert!(matches!(err, Error::Plot { ref artist, .. } if artist == "broken"));
        assert_eq!(drops.get(), 2);
        assert_eq!(shows.get(), 0);
    }

    #[test]
    fn test_show_called_when_enabled() {
        let dir = TempDir::new().unwrap();
        let drops = Rc::new(Cell::new(0));
        let shows = Rc::new(Cell::new(0));
        let (d, s) = (Rc::clone(&drops), Rc::clone(&shows));

        let plotter: Plotter<u8, u8> = Plotter::new("shown", move |_, _| {
            Ok(Plot::single(Tracked { drops: Rc::clone(&d), shows: Rc::clone(&s), fail: false }))
        })
        .show(true);

        plotter.render(&0, &0, dir.path()).unwrap();

        assert_eq!(shows.get(), 1);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_artist_error_is_wrapped_with_name() {
        let dir = TempDir::new().unwrap();
        let plotter: Plotter<u8, u8> = Plotter::new("nope", |_, _| anyhow::bail!("no data"));

        let err = plotter.render(&0, &0, dir.path()).unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(err.to_string().contains("no data"));
    }
}

//! Command dispatch
//!
//! A command-line front end parses process arguments into a [`Command`] and
//! hands it to [`RunStore::execute`]. Each variant maps to exactly one store
//! call:
//!
//! | Command              | Store call                              |
//! |----------------------|-----------------------------------------|
//! | `Run(config)`        | `create(config)`                        |
//! | `Preset(name)`       | `create(preset(name))`                  |
//! | `Plot(location)`     | `lookup(location)?.plot()`              |
//! | `Reproduce(location)`| `lookup(location)?.reproduce()`         |

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::experiment::{Location, RunStore};
use crate::{Error, Result};

/// Parsed command for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<C> {
    /// Run with a freshly supplied configuration.
    Run(C),
    /// Run with a registered preset configuration.
    Preset(String),
    /// Regenerate plots for an existing run.
    Plot(Location),
    /// Re-execute an existing run's configuration.
    Reproduce(Location),
}

/// What a command saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new run folder.
    Run(PathBuf),
    /// A new plot folder inside an existing run.
    Plots(PathBuf),
}

impl Outcome {
    /// Saved folder.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Run(path) | Self::Plots(path) => path,
        }
    }

    /// Consume into the saved folder.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Run(path) | Self::Plots(path) => path,
        }
    }
}

impl<C, R> RunStore<C, R>
where
    C: Clone + Serialize + DeserializeOwned,
    R: Serialize + DeserializeOwned,
{
    /// Execute a parsed command.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigurationUnavailable`] for an unknown preset; otherwise
    /// whatever the underlying store call returns.
    pub fn execute(&self, command: Command<C>) -> Result<Outcome> {
        let outcome = match command {
            Command::Run(config) => Outcome::Run(self.create(config)?.location().to_path_buf()),
            Command::Preset(name) => {
                let config = self.preset(&name).cloned().ok_or_else(|| {
                    let known: Vec<&str> = self.presets().keys().map(String::as_str).collect();
                    Error::ConfigurationUnavailable(format!(
                        "no preset named '{name}' (known: {})",
                        known.join(", ")
                    ))
                })?;
                Outcome::Run(self.create(config)?.location().to_path_buf())
            }
            Command::Plot(location) => Outcome::Plots(self.lookup(location)?.plot()?),
            Command::Reproduce(location) => {
                Outcome::Run(self.lookup(location)?.reproduce()?.location().to_path_buf())
            }
        };

        info!("Saved to '{}'", outcome.path().display());
        Ok(outcome)
    }
}

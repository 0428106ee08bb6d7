//! # trueno-runs: Reproducible Experiment Runs on Disk
//!
//! **Version**: 0.1.0
//!
//! trueno-runs binds a procedure `Fn(&Config) -> Result<Result>` to a
//! directory. Every invocation gets its own timestamped folder holding the
//! configuration, the result, ad hoc data files and generated plots. Stored
//! runs can be looked up, iterated, re-plotted, renamed, or reproduced from
//! their stored configuration.
//!
//! ## Design Principles
//!
//! - **Config first**: the configuration is on disk before the procedure
//!   starts, so a crash leaves something to inspect
//! - **Never overwrite**: run folders are created exclusively, plot and
//!   rename targets are de-duplicated with ` (n)` suffixes
//! - **Lazy reads**: iteration loads one run at a time
//!
//! ## Example Usage
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use trueno_runs::plot::{BytesFigure, Plot, Plotter};
//! use trueno_runs::RunStore;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Config { steps: usize }
//!
//! # fn main() -> trueno_runs::Result<()> {
//! # let root = tempfile::TempDir::new()?;
//! let store = RunStore::builder(root.path(), "walk", |c: &Config| Ok(vec![0.5_f64; c.steps]))
//!     .plotter(
//!         Plotter::new("trace", |_: &Config, r: &Vec<f64>| {
//!             Ok(Plot::single(BytesFigure::new(format!("{r:?}"))))
//!         })
//!         .format("txt"),
//!     )
//!     .build();
//!
//! let run = store.create(Config { steps: 3 })?;
//! assert!(run.location().join("plots/plot/trace.txt").is_file());
//!
//! let again = run.reproduce()?;
//! assert_ne!(again.location(), run.location());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod command;
pub mod context;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod naming;
pub mod plot;
pub mod serialization;

pub use command::{Command, Outcome};
pub use error::{Error, Result};
pub use experiment::{Location, Run, RunStore, RunStoreBuilder, Runs};

//! Run store: persisted, reproducible runs of one procedure
//!
//! ## Layout
//!
//! ```text
//! <directory>/<name>/                       RunStore::folder()
//!     2024-03-01 09-15-02.123456/           one folder per run
//!         config.bin
//!         result.bin
//!         data/...                          files opened through `context::open`
//!         plots/
//!             plot/                         first plot call
//!             plot (1)/                     second plot call
//! ```
//!
//! A folder counts as a run only if it holds both blobs. Folders left behind
//! by a failed procedure (config, no result) are skipped by iteration and
//! reported as not found by lookup.
//!
//! ## Usage
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use trueno_runs::{Location, RunStore};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Config { n: u64 }
//!
//! # fn main() -> trueno_runs::Result<()> {
//! # let root = tempfile::TempDir::new()?;
//! let store = RunStore::builder(root.path(), "squares", |c: &Config| Ok(c.n * c.n))
//!     .preset("small", Config { n: 3 })
//!     .build();
//!
//! let run = store.create(Config { n: 4 })?;
//! assert_eq!(*run.result(), 16);
//!
//! let name = run.name().unwrap_or_default();
//! let again = store.lookup(Location::name(name))?;
//! assert_eq!(again.config(), run.config());
//! # Ok(())
//! # }
//! ```

mod location;
mod run_record;
mod store;

pub use location::Location;
pub use run_record::{Run, PLOTS_DIR, PLOT_FOLDER};
pub use store::{Runs, RunStore, RunStoreBuilder};

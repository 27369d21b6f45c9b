//! Command implementations.
//!
//! Each command is a separate module that implements its own CLI args and
//! execution logic.

mod inspect;
mod simulate;
mod validate;

pub use inspect::Inspect;
pub use simulate::Simulate;
pub use validate::Validate;

use std::path::PathBuf;

use combat_content::ContentFactory;

/// Output formats shared by every command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

/// Content factory over `--data-dir`, or the data bundled with the content crate.
pub(crate) fn content_factory(data_dir: Option<PathBuf>) -> ContentFactory {
    data_dir.map_or_else(ContentFactory::bundled, ContentFactory::new)
}

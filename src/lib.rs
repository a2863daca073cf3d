//! dotlink - Package-oriented symlink manager
//!
//! Each package is a directory with a `dotlink.json` manifest. Its files are
//! linked into a target directory (usually the home directory), merging into
//! existing real directories file by file and linking whole directories when
//! nothing is in the way.

pub mod error;
pub mod filters;
pub mod fs;
pub mod linker;
pub mod manifest;
pub mod package;
pub mod prompt;
pub mod vars;
pub mod walker;

pub use error::{Error, SkipReason};
pub use linker::{ConflictStrategy, Linker, Outcome, SyncOptions, SyncResult};
pub use manifest::{Manifest, TargetDir};
pub use package::Package;
pub use prompt::Prompter;
pub use vars::Variables;

use std::path::PathBuf;

use thiserror::Error;

/// Domain failures that abort a run.
#[derive(Debug, Error)]
pub enum IncludesError {
    /// An exclusion entry names a path that does not exist on disk.
    #[error("Excluded path '{path}' (listed under '{key}') does not exist")]
    ExcludePathMissing {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The selected platform is not a header-bearing child of the platform directory.
    #[error("Platform '{platform}' not found among header directories in '{platform_dir}'")]
    PlatformNotFound {
        platform: String,
        platform_dir: String,
    },

    /// The properties file parsed, but its shape is unusable.
    #[error("Invalid properties document: {0}")]
    InvalidDocument(String),

    /// `--exclude` argument not in `KEY=PATH` form.
    #[error("Invalid exclude '{0}': expected KEY=PATH")]
    InvalidExcludeArg(String),
}

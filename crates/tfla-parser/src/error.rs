use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a configuration tree.
///
/// Only the root checks abort a run; per-file failures are logged and the
/// file is skipped.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input directory {path} does not exist")]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input path {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid HCL in {path}: {source}")]
    Hcl {
        path: PathBuf,
        #[source]
        source: hcl::Error,
    },
}

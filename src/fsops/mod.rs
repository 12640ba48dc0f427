pub mod operations;
pub mod temp;

pub use operations::FileSystemOps;
pub use temp::TempWorkspace;

use crate::git::GitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

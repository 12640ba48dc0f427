pub mod executor;

pub use executor::{GitError, GitExecutor};

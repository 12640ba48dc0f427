pub mod manager;
pub mod tool;

pub use manager::PackageManager;
pub use tool::{ParseToolError, Tool};

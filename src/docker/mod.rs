pub mod ops;

pub use ops::{DockerError, DockerOps};

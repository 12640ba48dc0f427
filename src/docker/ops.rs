use crate::config::DevConfig;
use crate::exec::{ExecError, Runner};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockerError {
    #[error("No docker registry configured (set docker.registry)")]
    NoRegistry,

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Image lifecycle operations shelling out to the docker CLI
///
/// Image name, registry and Dockerfile come from configuration; any
/// docker failure propagates with its captured output streams.
#[derive(Debug)]
pub struct DockerOps {
    image: String,
    registry: Option<String>,
    dockerfile: String,
    runner: Runner,
}

impl DockerOps {
    pub fn new(config: &DevConfig, runner: Runner) -> Self {
        Self {
            image: config.docker_image(),
            registry: config.docker_registry(),
            dockerfile: config.dockerfile(),
            runner,
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Fully qualified image reference for pushes
    pub fn remote_tag(&self) -> Result<String, DockerError> {
        match &self.registry {
            Some(registry) => Ok(format!("{}/{}", registry, self.image)),
            None => Err(DockerError::NoRegistry),
        }
    }

    /// `docker build -t <image> -f <dockerfile> .`
    pub fn build(&self) -> Result<(), DockerError> {
        self.runner.run(
            "docker",
            &["build", "-t", &self.image, "-f", &self.dockerfile, "."],
        )?;
        Ok(())
    }

    /// Tag the local image for the registry and push it
    pub fn push(&self) -> Result<(), DockerError> {
        let remote = self.remote_tag()?;
        self.runner.run("docker", &["tag", &self.image, &remote])?;
        self.runner.run("docker", &["push", &remote])?;
        Ok(())
    }

    /// Local image listing for the configured name
    pub fn status(&self) -> Result<String, DockerError> {
        let output = self.runner.run("docker", &["images", &self.image])?;
        Ok(output.stdout)
    }

    /// Remove the local image (and the registry tag when configured)
    pub fn clean(&self) -> Result<(), DockerError> {
        if let Ok(remote) = self.remote_tag() {
            // The remote tag may not exist locally; that is not fatal
            let _ = self.runner.run("docker", &["rmi", &remote]);
        }
        self.runner.run("docker", &["rmi", &self.image])?;
        Ok(())
    }
}

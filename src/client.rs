use anyhow::Result;

use crate::spec::ServiceSpec;

/// The injected container-orchestration client.
///
/// The factory borrows one of these and never owns it; acquiring and tearing
/// down the underlying session is the caller's job. Its single operation
/// hands out a fresh, unconfigured container handle.
pub trait ContainerClient {
    type Container: ContainerHandle;

    /// Returns a new empty container handle to build on.
    fn container(&self) -> Result<Self::Container>;
}

/// A composable, by-value container builder handle.
///
/// Each operation consumes the handle and returns an updated one, mirroring
/// how orchestration SDKs chain immutable pipeline nodes. Handles are `Clone`
/// so one base service can feed several pipelines. Configuration is recorded
/// eagerly; whether an operation also performs I/O (image pulls, command
/// execution) is up to the implementation — errors from that I/O propagate
/// unchanged through the `Result`.
pub trait ContainerHandle: Sized + Clone {
    /// Selects the base image by full reference (name and tag).
    fn from_image(self, reference: &str) -> Result<Self>;

    /// Sets an environment variable on the container.
    fn with_env_variable(self, name: &str, value: &str) -> Result<Self>;

    /// Exposes a network port to services bound to this one.
    fn with_exposed_port(self, port: u16) -> Result<Self>;

    /// Queues a command (argument list) to run in the container.
    fn with_exec(self, args: &[&str]) -> Result<Self>;

    /// Sets the working directory for subsequently queued commands.
    fn with_workdir(self, path: &str) -> Result<Self>;

    /// Attaches another service as a network dependency reachable under
    /// `alias`.
    fn with_service_binding(self, alias: &str, service: Self) -> Result<Self>;

    /// The configuration accumulated so far.
    fn spec(&self) -> &ServiceSpec;

    /// Realizes the pipeline and returns the last queued command's standard
    /// output.
    fn stdout(self) -> Result<String>;
}

pub mod docker;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use docker::DockerClient;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{RecordedContainer, RecordingClient};

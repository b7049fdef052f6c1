pub mod client;
pub mod clients;
pub mod factory;
pub mod notifier;
pub mod spec;

// Re-exports for easy access
pub use client::{ContainerClient, ContainerHandle};
pub use clients::DockerClient;
#[cfg(any(test, feature = "test-utils"))]
pub use clients::RecordingClient;
pub use factory::ServiceFactory;
pub use notifier::Notifier;
pub use spec::ServiceSpec;

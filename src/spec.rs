use serde::{Deserialize, Serialize};

/// Declarative record of everything a service handle has been asked to do.
///
/// Every [`crate::ContainerHandle`] implementation accumulates one of these
/// while the pipeline is composed; concrete clients read it back when they
/// realize the container. Field order of `env` matters: variables are applied
/// in the order they were set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Full image reference, e.g. `mariadb:11`. Empty until `from_image`.
    #[serde(default)]
    pub image: String,
    /// Environment variables in application order.
    #[serde(default)]
    pub env: Vec<(String, String)>,
    /// Ports the service exposes to bound peers.
    #[serde(default)]
    pub exposed_ports: Vec<u16>,
    /// Working directory for queued commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    /// Commands queued with `with_exec`, oldest first.
    #[serde(default)]
    pub execs: Vec<Vec<String>>,
    /// Services attached with `with_service_binding`: alias plus the bound
    /// service's own spec.
    #[serde(default)]
    pub bindings: Vec<(String, ServiceSpec)>,
}

impl ServiceSpec {
    /// Looks up an environment variable by name.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolves an image name and optional version tag into a full reference.
/// A missing or empty version falls back to "latest".
pub fn image_reference(name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() => format!("{}:{}", name, v),
        _ => format!("{}:latest", name),
    }
}

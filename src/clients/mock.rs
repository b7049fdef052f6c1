//! In-memory client for tests: records configuration, touches nothing.

use anyhow::Result;

use crate::client::{ContainerClient, ContainerHandle};
use crate::spec::ServiceSpec;

/// Recording implementation of [`ContainerClient`].
///
/// Handles only accumulate their [`ServiceSpec`]; `stdout` returns whatever
/// output the client was constructed with.
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    canned_stdout: String,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose pipelines all "produce" the given output.
    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            canned_stdout: stdout.to_string(),
        }
    }
}

impl ContainerClient for RecordingClient {
    type Container = RecordedContainer;

    fn container(&self) -> Result<RecordedContainer> {
        Ok(RecordedContainer {
            spec: ServiceSpec::default(),
            stdout: self.canned_stdout.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedContainer {
    spec: ServiceSpec,
    stdout: String,
}

impl ContainerHandle for RecordedContainer {
    fn from_image(mut self, reference: &str) -> Result<Self> {
        self.spec.image = reference.to_string();
        Ok(self)
    }

    fn with_env_variable(mut self, name: &str, value: &str) -> Result<Self> {
        self.spec.env.push((name.to_string(), value.to_string()));
        Ok(self)
    }

    fn with_exposed_port(mut self, port: u16) -> Result<Self> {
        self.spec.exposed_ports.push(port);
        Ok(self)
    }

    fn with_exec(mut self, args: &[&str]) -> Result<Self> {
        self.spec
            .execs
            .push(args.iter().map(|a| a.to_string()).collect());
        Ok(self)
    }

    fn with_workdir(mut self, path: &str) -> Result<Self> {
        self.spec.workdir = Some(path.to_string());
        Ok(self)
    }

    fn with_service_binding(mut self, alias: &str, service: Self) -> Result<Self> {
        self.spec
            .bindings
            .push((alias.to_string(), service.spec.clone()));
        Ok(self)
    }

    fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    fn stdout(self) -> Result<String> {
        Ok(self.stdout)
    }
}

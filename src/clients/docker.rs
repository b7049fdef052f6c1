//! Docker CLI implementation of the client traits.
//!
//! Composition stays declarative: handle operations only record into the
//! [`ServiceSpec`]; no docker process is spawned until the pipeline is
//! evaluated, matching how orchestration SDKs defer work to the terminal
//! operation. Realization happens in [`ContainerHandle::stdout`]:
//! - the base image and every bound service's image are pulled first,
//! - queued commands are applied one at a time, each step run in a fresh
//!   container and committed to a derived image; the last queued command
//!   runs in the foreground and its output is returned,
//! - service bindings are started detached on a per-run bridge network and
//!   reachable under their alias; they are stopped again once the
//!   foreground command finishes.
//!
//! Any docker failure is surfaced as an error carrying docker's stderr.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use crate::client::{ContainerClient, ContainerHandle};
use crate::spec::ServiceSpec;

/// Docker implementation of [`ContainerClient`].
pub struct DockerClient;

impl DockerClient {
    pub fn new() -> Result<Self> {
        let output = Command::new("docker")
            .arg("--version")
            .output()
            .context("Failed to execute docker command. Is Docker installed and running?")?;

        if !output.status.success() {
            return Err(anyhow!("Docker is not available"));
        }

        Ok(Self)
    }
}

impl ContainerClient for DockerClient {
    type Container = DockerContainer;

    fn container(&self) -> Result<DockerContainer> {
        Ok(DockerContainer {
            spec: ServiceSpec::default(),
        })
    }
}

fn docker<S: AsRef<str> + std::fmt::Debug>(args: &[S]) -> Result<String> {
    let output = Command::new("docker")
        .args(args.iter().map(|a| a.as_ref()))
        .output()
        .context(format!("Failed to execute docker command: {:?}", args))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("Docker command failed: {}", error));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    Ok(stdout)
}

/// `-e NAME=VALUE` pairs for every variable in the spec, in order.
fn env_args(spec: &ServiceSpec) -> Vec<String> {
    let mut args = Vec::with_capacity(spec.env.len() * 2);
    for (name, value) in &spec.env {
        args.push("-e".to_string());
        args.push(format!("{}={}", name, value));
    }
    args
}

/// Arguments for one setup step: run `cmd` in `image` in the foreground,
/// writing the container id to `cidfile` so the result can be committed.
fn setup_step_args(spec: &ServiceSpec, image: &str, cidfile: &str, cmd: &[String]) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--cidfile".to_string(), cidfile.to_string()];
    args.extend(env_args(spec));
    if let Some(workdir) = &spec.workdir {
        args.push("-w".to_string());
        args.push(workdir.clone());
    }
    args.push(image.to_string());
    args.extend(cmd.iter().cloned());
    args
}

/// Arguments to start a bound service detached on `network` under `alias`.
fn sidecar_run_args(spec: &ServiceSpec, image: &str, network: &str, alias: &str) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--rm".to_string(),
        "--name".to_string(),
        format!("{}-{}", network, alias),
        "--network".to_string(),
        network.to_string(),
        "--network-alias".to_string(),
        alias.to_string(),
    ];
    args.extend(env_args(spec));
    for port in &spec.exposed_ports {
        args.push("--expose".to_string());
        args.push(port.to_string());
    }
    args.push(image.to_string());
    args
}

/// Arguments for the final foreground command of a pipeline.
fn pipeline_run_args(
    spec: &ServiceSpec,
    image: &str,
    network: Option<&str>,
    cmd: &[String],
) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--rm".to_string()];
    if let Some(network) = network {
        args.push("--network".to_string());
        args.push(network.to_string());
    }
    args.extend(env_args(spec));
    if let Some(workdir) = &spec.workdir {
        args.push("-w".to_string());
        args.push(workdir.clone());
    }
    args.push(image.to_string());
    args.extend(cmd.iter().cloned());
    args
}

/// Cidfile path for one setup step. `docker run --cidfile` refuses to start
/// when the file already exists, so paths carry the target name: the base
/// pipeline and every bound service get their own sequence within the same
/// scratch directory.
fn step_cidfile(scratch: &Path, target: &str, step: usize) -> PathBuf {
    scratch.join(format!("{}-step-{}.cid", target, step))
}

/// Applies `steps` to `image` one commit at a time, returning the id of the
/// final derived image. Every committed image id is appended to `derived`
/// so the caller can remove them once the pipeline is done.
fn apply_setup_steps(
    spec: &ServiceSpec,
    image: &str,
    steps: &[Vec<String>],
    target: &str,
    scratch: &TempDir,
    derived: &mut Vec<String>,
) -> Result<String> {
    let mut current = image.to_string();

    for (i, step) in steps.iter().enumerate() {
        info!("Applying setup step {} for {}: {:?}", i + 1, target, step);

        let cidfile = step_cidfile(scratch.path(), target, i);
        let cidfile_str = cidfile
            .to_str()
            .ok_or_else(|| anyhow!("Non-UTF-8 scratch path: {:?}", cidfile))?;

        docker(&setup_step_args(spec, &current, cidfile_str, step))?;

        let cid = fs::read_to_string(&cidfile)
            .context("Failed to read container id for setup step")?;
        let cid = cid.trim();

        let committed = docker(&["commit".to_string(), cid.to_string()])?;
        docker(&["rm".to_string(), cid.to_string()])?;

        current = committed.trim().to_string();
        derived.push(current.clone());
        debug!("Setup step {} committed as {}", i + 1, current);
    }

    Ok(current)
}

/// Docker invocations that undo everything a pipeline run created: stop the
/// sidecars, drop the network, then untag the committed images newest-first
/// (later commits are built on earlier ones).
fn teardown_plan(
    sidecars: &[String],
    network: Option<&str>,
    derived: &[String],
) -> Vec<Vec<String>> {
    let mut plan = Vec::new();
    for name in sidecars {
        plan.push(vec!["stop".to_string(), name.clone()]);
    }
    if let Some(network) = network {
        plan.push(vec![
            "network".to_string(),
            "rm".to_string(),
            network.to_string(),
        ]);
    }
    for image in derived.iter().rev() {
        plan.push(vec!["rmi".to_string(), image.clone()]);
    }
    plan
}

/// Docker-backed container handle. Cloning is cheap: only the recorded
/// spec is copied, never any container state.
#[derive(Debug, Clone)]
pub struct DockerContainer {
    spec: ServiceSpec,
}

impl ContainerHandle for DockerContainer {
    fn from_image(mut self, reference: &str) -> Result<Self> {
        debug!("Base image set to '{}'", reference);
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
            .push((alias.to_string(), service.spec));
        Ok(self)
    }

    fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    fn stdout(self) -> Result<String> {
        let spec = self.spec;
        if spec.image.is_empty() {
            return Err(anyhow!("No base image selected for this pipeline"));
        }
        let (last, setup) = spec
            .execs
            .split_last()
            .ok_or_else(|| anyhow!("No command queued on this pipeline"))?;

        info!("Pulling image '{}'...", spec.image);
        docker(&["pull", spec.image.as_str()])?;

        let scratch = TempDir::new().context("Failed to create scratch directory")?;

        // Scratch dir names are unique per run, which makes them a usable
        // network/container name suffix.
        let run_id = scratch
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().trim_start_matches('.').to_lowercase())
            .unwrap_or_else(|| format!("{}", std::process::id()));

        let mut derived: Vec<String> = Vec::new();
        let mut sidecars: Vec<String> = Vec::new();
        let mut network: Option<String> = None;

        let result = run_pipeline(
            &spec,
            setup,
            last,
            &run_id,
            &scratch,
            &mut derived,
            &mut sidecars,
            &mut network,
        );

        // Sidecars, the network and the committed images were created here,
        // so they are torn down here too, whether the run succeeded, failed,
        // or stopped partway through setup.
        for step in teardown_plan(&sidecars, network.as_deref(), &derived) {
            if let Err(err) = docker(&step) {
                debug!("Teardown step {:?} failed: {}", step, err);
            }
        }

        result
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pipeline(
    spec: &ServiceSpec,
    setup: &[Vec<String>],
    last: &[String],
    run_id: &str,
    scratch: &TempDir,
    derived: &mut Vec<String>,
    sidecars: &mut Vec<String>,
    network: &mut Option<String>,
) -> Result<String> {
    let image = apply_setup_steps(spec, &spec.image, setup, "base", scratch, derived)?;

    if !spec.bindings.is_empty() {
        let name = format!("forge-{}", run_id);
        info!("Creating network '{}'", name);
        docker(&["network", "create", name.as_str()])?;
        *network = Some(name);
    }

    start_sidecars(spec, network.as_deref(), sidecars, scratch, derived)?;

    info!("Running pipeline command {:?}", last);
    docker(&pipeline_run_args(spec, &image, network.as_deref(), last))
}

fn start_sidecars(
    spec: &ServiceSpec,
    network: Option<&str>,
    started: &mut Vec<String>,
    scratch: &TempDir,
    derived: &mut Vec<String>,
) -> Result<()> {
    let Some(network) = network else {
        return Ok(());
    };

    for (alias, bound) in &spec.bindings {
        info!("Pulling image '{}'...", bound.image);
        docker(&["pull", bound.image.as_str()])?;

        // A bound service's queued commands are setup steps: apply them
        // before starting it with its image's own entrypoint. Cidfiles are
        // namespaced by alias so they cannot clash with the base pipeline's.
        let target = format!("svc-{}", alias);
        let image = apply_setup_steps(bound, &bound.image, &bound.execs, &target, scratch, derived)?;

        info!("Starting service '{}' from {}", alias, bound.image);
        docker(&sidecar_run_args(bound, &image, network, alias))?;
        started.push(format!("{}-{}", network, alias));
    }

    Ok(())
}

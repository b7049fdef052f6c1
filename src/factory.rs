//! Pre-configured sidecar services for the Drupal test pipeline.
//!
//! [`ServiceFactory`] is a thin recipe layer over an injected
//! [`ContainerClient`]: it knows which images, credentials, ports and setup
//! commands the pipeline's two sidecars need, and nothing else. It keeps no
//! state between calls and defines no error kinds of its own — whatever the
//! client reports bubbles up unchanged.

use anyhow::Result;
use log::debug;

use crate::client::{ContainerClient, ContainerHandle};
use crate::spec::image_reference;

/// Image name the database service is built from; the version tag is
/// appended per call.
pub const MARIADB_IMAGE: &str = "mariadb";

/// Pinned base image for the application service.
pub const DRUPAL_IMAGE: &str = "drupal:10.0.7-php8.2-fpm";

/// Setup command applied to the application service.
pub const DRUPAL_SETUP: &[&str] = &[
    "composer",
    "require",
    "drupal/core-dev",
    "--dev",
    "--update-with-all-dependencies",
];

const MARIADB_ENV: &[(&str, &str)] = &[
    ("MARIADB_USER", "user"),
    ("MARIADB_PASSWORD", "password"),
    ("MARIADB_DATABASE", "drupal"),
    ("MARIADB_ROOT_PASSWORD", "root"),
];

const MARIADB_PORT: u16 = 3306;

/// Builds the pipeline's sidecar services against a borrowed client.
///
/// ### Type parameters
/// - `C`: the orchestration client (see [`crate::clients`]) that turns the
///   fixed recipes below into live container handles.
pub struct ServiceFactory<'a, C: ContainerClient> {
    client: &'a C,
}

impl<'a, C: ContainerClient> ServiceFactory<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Returns the MariaDB sidecar: `mariadb:{version}` (version defaults to
    /// "latest" when omitted or empty), fixed test credentials, port 3306
    /// exposed.
    pub fn mariadb_service(&self, version: Option<&str>) -> Result<C::Container> {
        let reference = image_reference(MARIADB_IMAGE, version);
        debug!("Configuring MariaDB sidecar from {}", reference);

        let mut container = self.client.container()?.from_image(&reference)?;
        for (name, value) in MARIADB_ENV {
            container = container.with_env_variable(name, value)?;
        }
        container.with_exposed_port(MARIADB_PORT)
    }

    /// Returns the Drupal sidecar: the pinned base image with the dev
    /// dependencies installed via composer.
    pub fn drupal_service(&self) -> Result<C::Container> {
        debug!("Configuring Drupal sidecar from {}", DRUPAL_IMAGE);

        self.client
            .container()?
            .from_image(DRUPAL_IMAGE)?
            .with_exec(DRUPAL_SETUP)
    }
}

use anyhow::Result;

use sidecar_forge::client::{ContainerClient, ContainerHandle};
use sidecar_forge::spec::ServiceSpec;
use sidecar_forge::ServiceFactory;

// Local recording client; the crate's own mock lives behind the test-utils
// feature, so integration tests bring their own.
struct LoggingClient;

#[derive(Clone)]
struct LoggingContainer {
    spec: ServiceSpec,
    log: Vec<String>,
}

impl ContainerClient for LoggingClient {
    type Container = LoggingContainer;

    fn container(&self) -> Result<LoggingContainer> {
        Ok(LoggingContainer {
            spec: ServiceSpec::default(),
            log: vec!["container".to_string()],
        })
    }
}

impl ContainerHandle for LoggingContainer {
    fn from_image(mut self, reference: &str) -> Result<Self> {
        self.spec.image = reference.to_string();
        self.log.push(format!("from_image {}", reference));
        Ok(self)
    }

    fn with_env_variable(mut self, name: &str, value: &str) -> Result<Self> {
        self.spec.env.push((name.to_string(), value.to_string()));
        self.log.push(format!("env {}", name));
        Ok(self)
    }

    fn with_exposed_port(mut self, port: u16) -> Result<Self> {
        self.spec.exposed_ports.push(port);
        self.log.push(format!("expose {}", port));
        Ok(self)
    }

    fn with_exec(mut self, args: &[&str]) -> Result<Self> {
        self.spec
            .execs
            .push(args.iter().map(|a| a.to_string()).collect());
        self.log.push(format!("exec {}", args.join(" ")));
        Ok(self)
    }

    fn with_workdir(mut self, path: &str) -> Result<Self> {
        self.spec.workdir = Some(path.to_string());
        self.log.push(format!("workdir {}", path));
        Ok(self)
    }

    fn with_service_binding(mut self, alias: &str, service: Self) -> Result<Self> {
        self.spec
            .bindings
            .push((alias.to_string(), service.spec.clone()));
        self.log.push(format!("bind {}", alias));
        Ok(self)
    }

    fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    fn stdout(self) -> Result<String> {
        Ok(format!("ran: {}", self.log.join(" | ")))
    }
}

#[test]
fn test_mariadb_descriptor_for_version_11() {
    let client = LoggingClient;
    let factory = ServiceFactory::new(&client);

    let mariadb = factory.mariadb_service(Some("11")).unwrap();
    let spec = mariadb.spec();

    assert_eq!(spec.image, "mariadb:11");
    assert_eq!(
        spec.env,
        vec![
            ("MARIADB_USER".to_string(), "user".to_string()),
            ("MARIADB_PASSWORD".to_string(), "password".to_string()),
            ("MARIADB_DATABASE".to_string(), "drupal".to_string()),
            ("MARIADB_ROOT_PASSWORD".to_string(), "root".to_string()),
        ]
    );
    assert_eq!(spec.exposed_ports, vec![3306]);
    assert!(spec.execs.is_empty());
}

#[test]
fn test_mariadb_descriptor_without_version() {
    let client = LoggingClient;
    let factory = ServiceFactory::new(&client);

    let mariadb = factory.mariadb_service(None).unwrap();
    let spec = mariadb.spec();

    assert_eq!(spec.image, "mariadb:latest");
    assert_eq!(spec.env.len(), 4);
    assert_eq!(spec.exposed_ports, vec![3306]);
}

#[test]
fn test_operations_are_applied_in_recipe_order() {
    let client = LoggingClient;
    let factory = ServiceFactory::new(&client);

    let mariadb = factory.mariadb_service(Some("10")).unwrap();
    assert_eq!(
        mariadb.log,
        vec![
            "container",
            "from_image mariadb:10",
            "env MARIADB_USER",
            "env MARIADB_PASSWORD",
            "env MARIADB_DATABASE",
            "env MARIADB_ROOT_PASSWORD",
            "expose 3306",
        ]
    );
}

#[test]
fn test_drupal_descriptor() {
    let client = LoggingClient;
    let factory = ServiceFactory::new(&client);

    let drupal = factory.drupal_service().unwrap();
    let spec = drupal.spec();

    assert_eq!(spec.image, "drupal:10.0.7-php8.2-fpm");
    assert_eq!(
        spec.execs,
        vec![vec![
            "composer".to_string(),
            "require".to_string(),
            "drupal/core-dev".to_string(),
            "--dev".to_string(),
            "--update-with-all-dependencies".to_string(),
        ]]
    );
}

#[test]
fn test_version_matrix_composition() {
    // The shape of the CI driver: one Drupal service reused across a
    // MariaDB version loop via service bindings.
    let client = LoggingClient;
    let factory = ServiceFactory::new(&client);

    let drupal = factory.drupal_service().unwrap();

    for version in ["latest", "11", "10"] {
        let mariadb = factory.mariadb_service(Some(version)).unwrap();
        let pipeline = drupal
            .clone()
            .with_service_binding("db", mariadb)
            .unwrap()
            .with_env_variable("SIMPLETEST_DB", "mysql://user:password@db/drupal")
            .unwrap()
            .with_workdir("/opt/drupal/web/core")
            .unwrap()
            .with_exec(&["../../vendor/bin/phpunit", "-v", "--group", "KernelTests"])
            .unwrap();

        let spec = pipeline.spec();
        assert_eq!(spec.bindings.len(), 1);
        assert_eq!(spec.bindings[0].0, "db");
        assert_eq!(spec.bindings[0].1.image, format!("mariadb:{}", version));
        // The Drupal base is untouched by the loop: setup command first,
        // phpunit queued after it.
        assert_eq!(spec.execs.len(), 2);
        assert_eq!(spec.execs[1][0], "../../vendor/bin/phpunit");

        let output = pipeline.stdout().unwrap();
        assert!(output.contains("bind db"));
        assert!(output.contains("exec ../../vendor/bin/phpunit -v --group KernelTests"));
    }
}

#[test]
fn test_pipeline_spec_round_trips_through_json() {
    let client = LoggingClient;
    let factory = ServiceFactory::new(&client);

    let mariadb = factory.mariadb_service(Some("11")).unwrap();
    let drupal = factory.drupal_service().unwrap();
    let pipeline = drupal.with_service_binding("db", mariadb).unwrap();

    let json = serde_json::to_string(pipeline.spec()).unwrap();
    let back: ServiceSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, pipeline.spec());
}

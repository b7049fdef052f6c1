use anyhow::Result;
use clap::Parser;
use log::debug;

use sidecar_forge::{ContainerClient, ContainerHandle, DockerClient, Notifier, ServiceFactory};

const SIMPLETEST_DB: &str = "mysql://user:password@db/drupal";
const KERNEL_TESTS: &[&str] = &["../../vendor/bin/phpunit", "-v", "--group", "KernelTests"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "latest,11,10",
        help = "MariaDB versions to run the kernel tests against"
    )]
    versions: Vec<String>,

    #[arg(
        long,
        help = "Print the composed pipelines as JSON instead of running them"
    )]
    dump: bool,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Verbose mode (-v for info, -vv for debug, -vvv for trace). Also switches to text-based progress"
    )]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let notifier = Notifier::init(cli.verbose);

    debug!("MariaDB versions: {:?}", cli.versions);

    let client = DockerClient::new()?;
    let factory = ServiceFactory::new(&client);

    notifier.status("Preparing Drupal service...");
    let drupal = factory.drupal_service()?;

    if cli.dump {
        return dump_pipelines(&factory, drupal, &cli.versions);
    }

    let bar = notifier.matrix_bar(cli.versions.len() as u64);

    for version in &cli.versions {
        if let Some(bar) = &bar {
            bar.set_message(format!("MariaDB {}", version));
        }
        notifier.status(&format!("Starting tests for MariaDB {}", version));

        let mariadb = factory.mariadb_service(Some(version))?;
        let output = test_pipeline(drupal.clone(), mariadb)?.stdout()?;

        println!("Starting tests for MariaDB {}", version);
        println!("{}", output);

        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    notifier.finish("All versions passed");

    Ok(())
}

/// Binds the database under the alias `db` and queues the kernel-test run,
/// exactly as the CI pipeline composes it.
fn test_pipeline<H: ContainerHandle>(drupal: H, mariadb: H) -> Result<H> {
    drupal
        .with_service_binding("db", mariadb)?
        .with_env_variable("SIMPLETEST_DB", SIMPLETEST_DB)?
        .with_env_variable("SYMFONY_DEPRECATIONS_HELPER", "disabled")?
        .with_workdir("/opt/drupal/web/core")?
        .with_exec(KERNEL_TESTS)
}

fn dump_pipelines<C: ContainerClient>(
    factory: &ServiceFactory<'_, C>,
    drupal: C::Container,
    versions: &[String],
) -> Result<()> {
    for version in versions {
        let mariadb = factory.mariadb_service(Some(version))?;
        let pipeline = test_pipeline(drupal.clone(), mariadb)?;
        println!("{}", serde_json::to_string_pretty(pipeline.spec())?);
    }
    Ok(())
}

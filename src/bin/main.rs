use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use schedkit::{
    cli::{Cli, Commands, DeploymentArgs, parse_args},
    config::load_config,
    constants::DOWNLOAD_TIMEOUT,
    deploy::{self, Deployer},
    deployment::Deployment,
    fetch::HttpFetcher,
    options::SCHEDULER_OPTIONS,
    supervisor::Systemd,
    users::SystemUserProvisioner,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    init_logging(&args);

    match args.command {
        Commands::Create { target } => {
            let deployment = build_deployment(&target)?;
            system_deployer()?.create(&deployment)?;
            info!(
                "kube-scheduler installed at {}",
                deployment.deployment.binary_path.display()
            );
        }
        Commands::Start { target } => {
            let deployment = build_deployment(&target)?;
            system_deployer()?.start(&deployment)?;
        }
        Commands::Render { target, json, exec } => {
            let deployment = build_deployment(&target)?;
            if exec {
                println!("{}", deploy::render_command(&deployment));
            } else if json {
                let unit = deploy::render_unit(&deployment);
                println!("{}", serde_json::to_string_pretty(&unit)?);
            } else {
                print!("{}", deploy::render_unit(&deployment).render());
            }
        }
        Commands::Flags { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(SCHEDULER_OPTIONS)?);
            } else {
                print_flags();
            }
        }
    }

    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_deployment(target: &DeploymentArgs) -> Result<Deployment, Box<dyn Error>> {
    let mut config = load_config(target.config.as_deref())?;
    config.apply_overrides(target.overrides.iter().cloned());
    Ok(config.into_deployment()?)
}

fn system_deployer()
-> Result<Deployer<HttpFetcher, SystemUserProvisioner, Systemd>, Box<dyn Error>> {
    Ok(Deployer::new(
        HttpFetcher::new(DOWNLOAD_TIMEOUT)?,
        SystemUserProvisioner::default(),
        Systemd::default(),
    ))
}

fn print_flags() {
    let width = SCHEDULER_OPTIONS
        .iter()
        .map(|spec| spec.name.len())
        .max()
        .unwrap_or(0);

    println!("{:<width$}  {:<8}  {:<8}  DEFAULT", "FLAG", "TYPE", "EMIT");
    for spec in SCHEDULER_OPTIONS {
        let default = spec
            .default
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<width$}  {:<8}  {:<8}  {default}",
            spec.name,
            spec.kind.as_ref(),
            spec.emit.as_ref(),
        );
    }
}

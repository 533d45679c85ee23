//! Subcommand handlers
//!
//! Each handler wires the real collaborators into the orchestrator, runs
//! one core operation, and maps the result to a process exit code.

use super::commands::{BuildArgs, OutputFormatArg, OverridesArgs, PushArgs, ServicesArgs};
use crate::catalog::ServiceCatalog;
use crate::compose::DockerCompose;
use crate::config::StackpinConfig;
use crate::fs::RealFileSystem;
use crate::git::GitCli;
use crate::orchestrator::{Orchestrator, RunOptions};
use crate::overrides;
use crate::progress::LoggingHandler;
use crate::runtime::DockerRuntime;
use std::sync::Arc;
use tracing::error;

fn run_options(config: &StackpinConfig, write_overrides: bool, deploy: bool) -> RunOptions {
    RunOptions {
        manifest_path: config.manifest_path.clone(),
        override_path: config.override_path.clone(),
        project_root: config.project_root.clone(),
        write_overrides,
        deploy,
    }
}

fn orchestrator() -> anyhow::Result<Orchestrator> {
    let runtime = DockerRuntime::connect()?;
    Ok(Orchestrator::new(
        Arc::new(RealFileSystem::new()),
        Arc::new(runtime),
        Arc::new(GitCli::new()),
        Arc::new(DockerCompose::new()),
    )
    .with_progress(Arc::new(LoggingHandler)))
}

pub async fn handle_services(args: &ServicesArgs, config: &StackpinConfig) -> i32 {
    let catalog = ServiceCatalog::new(&config.manifest_path);
    let services = match catalog.load(&RealFileSystem::new()) {
        Ok(services) => services,
        Err(e) => {
            error!("{e}");
            return 1;
        }
    };

    match args.format {
        OutputFormatArg::Human => {
            for service in &services {
                match &service.src {
                    Some(src) => println!("{}\t{}\t{}", service.name, service.image, src.display()),
                    None => println!("{}\t{}", service.name, service.image),
                }
            }
        }
        OutputFormatArg::Json => match serde_json::to_string_pretty(&services) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                error!("failed to serialize services: {e}");
                return 1;
            }
        },
        OutputFormatArg::Yaml => match serde_yaml::to_string(&services) {
            Ok(out) => print!("{out}"),
            Err(e) => {
                error!("failed to serialize services: {e}");
                return 1;
            }
        },
    }
    0
}

pub async fn handle_build(args: &BuildArgs, config: &StackpinConfig, deploy: bool) -> i32 {
    let orchestrator = match orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("{e:#}");
            return 1;
        }
    };

    let mut options = run_options(config, true, deploy);
    if let Some(override_file) = &args.override_file {
        options.override_path = override_file.clone();
    }

    match orchestrator.run(&options).await {
        Ok(_) => 0,
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

pub async fn handle_overrides(args: &OverridesArgs, config: &StackpinConfig) -> i32 {
    let orchestrator = match orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("{e:#}");
            return 1;
        }
    };

    let options = run_options(config, !args.stdout, false);
    let report = match orchestrator.run(&options).await {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return 1;
        }
    };

    if args.stdout {
        match overrides::generate(&report.outcomes).to_yaml() {
            Ok(yaml) => print!("{yaml}"),
            Err(e) => {
                error!("{e:#}");
                return 1;
            }
        }
    }
    0
}

pub async fn handle_update(config: &StackpinConfig) -> i32 {
    let orchestrator = match orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("{e:#}");
            return 1;
        }
    };

    match orchestrator
        .update_sources(&run_options(config, false, false))
        .await
    {
        Ok(updated) => {
            println!("updated {updated} source tree(s)");
            0
        }
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

pub async fn handle_push(args: &PushArgs, config: &StackpinConfig) -> i32 {
    let orchestrator = match orchestrator() {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("{e:#}");
            return 1;
        }
    };

    match orchestrator
        .push_sources(&run_options(config, false, false), &args.message)
        .await
    {
        Ok(pushed) if pushed.is_empty() => {
            println!("nothing to push");
            0
        }
        Ok(pushed) => {
            for tree in pushed {
                println!("pushed {}", tree.display());
            }
            0
        }
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

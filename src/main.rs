use stackpin::cli::commands::{CliArgs, Commands};
use stackpin::cli::handlers::{
    handle_build, handle_overrides, handle_push, handle_services, handle_update,
};
use stackpin::config::StackpinConfig;
use stackpin::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("stackpin v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let config = StackpinConfig::default().with_manifest(args.file.clone());
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(2);
    }

    let exit_code = match &args.command {
        Commands::Services(services_args) => handle_services(services_args, &config).await,
        Commands::Build(build_args) => handle_build(build_args, &config, false).await,
        Commands::Deploy(build_args) => handle_build(build_args, &config, true).await,
        Commands::Overrides(overrides_args) => handle_overrides(overrides_args, &config).await,
        Commands::Update => handle_update(&config).await,
        Commands::Push(push_args) => handle_push(push_args, &config).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            let level_str = env::var("STACKPIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive(format!("stackpin={}", level).parse().unwrap())
                .add_directive("bollard=warn".parse().unwrap())
                .add_directive("hyper=warn".parse().unwrap());
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

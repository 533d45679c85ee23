use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compose stack builder that pins services to source-revision image tags
#[derive(Parser, Debug)]
#[command(
    name = "stackpin",
    about = "Compose stack builder that pins services to source-revision image tags",
    version,
    long_about = "stackpin maps services in a composition manifest to source trees, builds \
                  container images tagged by source revision, and regenerates an override \
                  document pinning each service to its freshly built (or pulled) image \
                  before bringing the stack up."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        short = 'f',
        long,
        global = true,
        value_name = "FILE",
        help = "Path to the composition manifest"
    )]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "List services from the manifest",
        long_about = "Lists every service in the composition manifest with its image and, \
                      when present, the source tree it is built from.\n\n\
                      Examples:\n  \
                      stackpin services\n  \
                      stackpin services --format json"
    )]
    Services(ServicesArgs),

    #[command(
        about = "Build every service image and regenerate the override document",
        long_about = "Resolves each source-backed service to its revision tag, builds any \
                      missing image, pulls any missing pre-built image, and rewrites the \
                      override document. Nothing is written when any service fails."
    )]
    Build(BuildArgs),

    #[command(
        about = "Build, regenerate overrides, and bring the stack up",
        long_about = "Runs the full build pass and, when every service succeeded, invokes \
                      the composition engine with the base manifest layered with the \
                      freshly written override document."
    )]
    Deploy(BuildArgs),

    #[command(
        about = "Regenerate or print the override document without deploying",
        long_about = "Runs the build pass and prints the resulting override document to \
                      stdout with --stdout, or writes it in place otherwise.\n\n\
                      Examples:\n  \
                      stackpin overrides\n  \
                      stackpin overrides --stdout"
    )]
    Overrides(OverridesArgs),

    #[command(about = "Fast-forward pull every source tree in the manifest")]
    Update,

    #[command(
        about = "Commit and push dirty source trees",
        long_about = "Enumerates source trees with uncommitted changes, then stages, \
                      commits, and pushes each one with the given message."
    )]
    Push(PushArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ServicesArgs {
    #[arg(long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the override document to FILE instead of the configured path"
    )]
    pub override_file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct OverridesArgs {
    #[arg(long, help = "Print the document to stdout instead of writing it")]
    pub stdout: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PushArgs {
    #[arg(short = 'm', long, value_name = "MESSAGE", help = "Commit message")]
    pub message: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

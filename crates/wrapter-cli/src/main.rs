mod cmd;
mod output;
mod root;
mod session;

use clap::{ArgAction, Parser, Subcommand};
use cmd::{config::ConfigSubcommand, create::CreateArgs};
use session::Session;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wrapter",
    about = "OpenTofu wrapper for account/environment/region service trees",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository root (default: walk up from --dir to the directory holding .git/)
    #[arg(long, global = true, env = "WRAPTER_ROOT")]
    root: Option<PathBuf>,

    /// Directory to operate on (default: current directory)
    #[arg(long, global = true, env = "WRAPTER_DIR")]
    dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Print tool invocations instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Increase log output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the remote state backend for the current service
    Init,

    /// Plan the current service and write tfplan.bin / tfplan.json
    Plan,

    /// Format every directory below the current one
    Fmt,

    /// Lock providers for all supported platforms in every directory
    Lock,

    /// Run tflint and a formatting check in every directory
    Lint,

    /// Validate every directory below the current one
    Validate {
        /// Report failing directories but exit successfully (also: ALLOW_FAIL_VALIDATION)
        #[arg(long)]
        allow_fail: bool,
    },

    /// Inject generated input/output docs into README.md in every directory
    Doc,

    /// Show the state key derived for the current directory
    Key,

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Bootstrap a service in the convention tree
    Create(CreateArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Session::open(cli.root.as_deref(), cli.dir.as_deref(), cli.json, cli.dry_run)
        .and_then(|session| match cli.command {
            Commands::Init => cmd::init::run(&session),
            Commands::Plan => cmd::plan::run(&session),
            Commands::Fmt => cmd::fmt::run(&session),
            Commands::Lock => cmd::lock::run(&session),
            Commands::Lint => cmd::lint::run(&session),
            Commands::Validate { allow_fail } => cmd::validate::run(&session, allow_fail),
            Commands::Doc => cmd::doc::run(&session),
            Commands::Key => cmd::key::run(&session),
            Commands::Config { subcommand } => cmd::config::run(&session, subcommand),
            Commands::Create(args) => cmd::create::run(&session, args),
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

//! Shroud CLI
//!
//! Inspect JSON stores through policy handles and run the policy demos.

use clap::{ArgAction, Parser, Subcommand};
use shroud_cli::commands::{demo, inspect};
use shroud_cli::output::{resolve_color_choice, stderr_error, StyledOutput};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "shroud")]
#[command(about = "Trap-based handles over key/value stores", long_about = None)]
#[command(version)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the keys visible through the configured handle
    Keys {
        /// JSON file holding the store
        store: PathBuf,
        /// Policy config (shroud.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Read one key through the configured handle
    Get {
        /// JSON file holding the store
        store: PathBuf,
        /// Key to read
        key: String,
        /// Policy config (shroud.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write one key through an observed handle (nothing is saved)
    Set {
        /// JSON file holding the store
        store: PathBuf,
        /// Key to write
        key: String,
        /// New value as JSON
        value: String,
        /// Policy config (shroud.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run a policy demo against a built-in record
    Demo {
        /// Policy to demonstrate
        #[arg(value_enum)]
        scenario: demo::Scenario,
        /// Policy config (shroud.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // Logs go to stderr so they never mix with command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli, out: &mut StyledOutput) -> anyhow::Result<()> {
    match cli.command {
        Commands::Keys { store, config } => inspect::keys(&store, config.as_deref(), out),
        Commands::Get { store, key, config } => {
            inspect::get(&store, &key, config.as_deref(), out)
        }
        Commands::Set {
            store,
            key,
            value,
            config,
        } => inspect::set(&store, &key, &value, config.as_deref(), out),
        Commands::Demo { scenario, config } => demo::execute(scenario, config.as_deref(), out),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let choice = resolve_color_choice(cli.color.as_deref());
    let mut out = StyledOutput::stdout(choice);
    let result = run(cli, &mut out);
    out.flush();

    if let Err(err) = result {
        stderr_error(choice, &format!("{err:#}"));
        std::process::exit(1);
    }
}

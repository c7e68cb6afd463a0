use clap::{Parser, Subcommand};
use scriptop::{
    cmd::{self, InspectArgs, ListArgs, RunArgs},
    config::AppConfig,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding app.yaml.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shows the parameters and metadata a script exposes.
    Inspect(InspectArgs),
    /// Runs a script and prints its result.
    Run(RunArgs),
    /// Lists the executable scripts in the script directories.
    List(ListArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    tracing::debug!(config_dir = ?cli.config_dir, "Loading application configuration...");
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::debug!(script_dirs = ?config.script_dirs, "Configuration loaded.");

    match cli.command {
        Commands::Inspect(args) => cmd::inspect::execute(&config, args)?,
        Commands::Run(args) => cmd::run::execute(&config, args)?,
        Commands::List(args) => cmd::list::execute(&config, args)?,
    }

    Ok(())
}

use clap::{CommandFactory, Parser, Subcommand};
use cancelwatch_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "cancelwatch-cli", version, about = "Cancelwatch CLI")]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every order row with its cancel state
    Status(commands::status::StatusArgs),
    /// Follow cancel countdowns until every window closes
    Watch(commands::watch::WatchArgs),
    /// Cancel an order while its window is still open
    Cancel(commands::cancel::CancelArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Initialize logging
fn init_logging(verbose: bool, default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "debug" } else { default_filter };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() {
    let cli = Cli::parse();
    // `config` subcommands load the file themselves so a broken one can
    // still be inspected or reset.
    let loaded = Config::load();
    let log_level = loaded.as_ref().map_or("warn", |config| config.log_level.as_str());
    init_logging(cli.verbose, log_level);

    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "cancelwatch-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        command => match loaded {
            Ok(config) => run(command, &config),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Status(args) => commands::status::run(args, config),
        Commands::Watch(args) => commands::watch::run(args, config),
        Commands::Cancel(args) => commands::cancel::run(args, config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { .. } => Ok(()),
    }
}

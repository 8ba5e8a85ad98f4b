//! AltText CLI - Accessible alt text suggestions from any LLM provider.
//!
//! AltText reads attachments from a JSON media library manifest, asks the
//! configured provider for a short alt text, and writes suggestions back to
//! the manifest.
//!
//! # Usage
//!
//! ```bash
//! # Suggest alt text for one attachment
//! alttext suggest 42
//!
//! # Use another provider and emit JSON
//! alttext suggest 42 43 --provider anthropic --format json
//!
//! # Prime every attachment without alt text
//! alttext prime --all
//!
//! # Preview the prompt the current settings produce
//! alttext prompt
//!
//! # Adjust persisted settings
//! alttext settings set --max-words 15 --tone "friendly"
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// AltText - Accessible alt text suggestions from any LLM provider.
#[derive(Parser, Debug)]
#[command(name = "alttext")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate alt text suggestions for attachments
    Suggest(cli::suggest::SuggestArgs),

    /// Prime attachments that have no alt text yet
    Prime(cli::prime::PrimeArgs),

    /// Show the prompt the current settings produce
    Prompt(cli::prompt::PromptArgs),

    /// View and change persisted prompt and vision settings
    Settings(cli::settings::SettingsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match alttext_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `alttext config path`."
            );
            alttext_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("AltText v{}", alttext_core::VERSION);

    match cli.command {
        Commands::Suggest(args) => cli::suggest::execute(args).await,
        Commands::Prime(args) => cli::prime::execute(args).await,
        Commands::Prompt(args) => cli::prompt::execute(args).await,
        Commands::Settings(args) => cli::settings::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

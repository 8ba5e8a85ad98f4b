//! The `alttext config` command for configuration management.

use alttext_core::Config;
use clap::{Args, Subcommand};
use console::Style;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (with saved settings applied)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store an API key for a provider in the config file
    SetKey {
        /// Provider name, e.g. "openai" or "anthropic"
        provider: String,

        /// The key, or an `${ENV_VAR}` reference
        key: String,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load_effective()?;
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
            let dim = Style::new().for_stderr().dim();
            eprintln!(
                "{}",
                dim.apply_to(format!("settings: {}", Config::settings_path().display()))
            );
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml = Config::default().to_toml()?;
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetKey { provider, key } => {
            save_key_to_config(&provider, &key)?;
        }
    }

    Ok(())
}

/// Write `[providers.<name>] api_key` into the config file, preserving comments.
fn save_key_to_config(provider: &str, key: &str) -> anyhow::Result<()> {
    let provider = provider.trim();
    if provider.is_empty() {
        anyhow::bail!("Provider name must not be empty");
    }

    let config_path = Config::default_path();
    let content = if config_path.exists() {
        std::fs::read_to_string(&config_path)?
    } else {
        String::new()
    };
    let doc = set_key_in_document(&content, provider, key)?;

    // A brand-new provider needs a driver; known family names imply their own.
    let known = Config::default().providers.contains_key(provider);
    if !known && doc["providers"][provider].get("driver").is_none() {
        tracing::warn!(
            "Provider '{provider}' has no driver; set providers.{provider}.driver \
             to \"openai\" or \"anthropic\" before using it."
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, doc.to_string())?;

    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        dim.apply_to(format!("Key saved to {}", config_path.display()))
    );
    Ok(())
}

fn set_key_in_document(
    content: &str,
    provider: &str,
    key: &str,
) -> anyhow::Result<toml_edit::DocumentMut> {
    let mut doc: toml_edit::DocumentMut = content.parse()?;

    if !doc.contains_key("providers") {
        let mut table = toml_edit::Table::new();
        table.set_implicit(true);
        doc["providers"] = toml_edit::Item::Table(table);
    }
    if !doc["providers"]
        .as_table()
        .is_some_and(|t| t.contains_key(provider))
    {
        doc["providers"][provider] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["providers"][provider]["api_key"] = toml_edit::value(key);

    Ok(doc)
}

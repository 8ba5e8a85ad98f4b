//! The `alttext settings` command for the persisted settings record.

use alttext_core::config::SettingsUpdate;
use alttext_core::{Config, SettingsStore};
use clap::{Args, Subcommand};
use console::Style;

/// Arguments for the `settings` command.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Subcommands for the settings record.
#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Display the saved record and the effective values
    Show,

    /// Change one or more settings (unset flags keep their saved value)
    Set(SetArgs),

    /// Delete the saved record and revert to config file values
    Reset,
}

/// Values accepted by `settings set`.
#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Tone the alt text should use
    #[arg(long)]
    pub tone: Option<String>,

    /// Word limit (clamped to 5..=60)
    #[arg(long, allow_negative_numbers = true)]
    pub max_words: Option<i64>,

    /// Extra instructions appended to the prompt ("" clears them)
    #[arg(long)]
    pub custom_instructions: Option<String>,

    /// Copy on-image text verbatim
    #[arg(long)]
    pub force_verbatim_text: Option<bool>,

    /// Send the image along with the prompt
    #[arg(long)]
    pub vision_enabled: Option<bool>,

    /// Image delivery mode: auto, url or base64
    #[arg(long)]
    pub vision_mode: Option<String>,
}

impl SetArgs {
    fn into_update(self) -> SettingsUpdate {
        SettingsUpdate {
            custom_instructions: self.custom_instructions,
            tone: self.tone,
            max_words: self.max_words,
            force_verbatim_text: self.force_verbatim_text,
            vision_enabled: self.vision_enabled,
            vision_mode: self.vision_mode,
        }
    }
}

/// Execute the settings command.
pub async fn execute(args: SettingsArgs) -> anyhow::Result<()> {
    let store = SettingsStore::new(Config::settings_path());
    let dim = Style::new().for_stderr().dim();

    match args.command {
        SettingsCommand::Show => {
            match store.load()? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => eprintln!(
                    "{}",
                    dim.apply_to("No saved settings; using config file values.")
                ),
            }

            let config = Config::load_effective()?;
            let bold = Style::new().bold();
            println!();
            println!("{}", bold.apply_to("Effective"));
            println!("  tone:                {}", config.prompt.tone);
            println!("  max_words:           {}", config.prompt.max_words);
            println!("  custom_instructions: {}", config.prompt.custom_instructions);
            println!("  force_verbatim_text: {}", config.prompt.force_verbatim_text);
            println!("  vision.enabled:      {}", config.vision.enabled);
            println!("  vision.mode:         {}", config.vision.mode);
        }

        SettingsCommand::Set(set) => {
            let saved = store.update(&set.into_update())?;
            tracing::info!("Settings saved to {}", store.path().display());
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }

        SettingsCommand::Reset => {
            if store.reset()? {
                println!("Settings reset ({} removed).", store.path().display());
            } else {
                eprintln!("{}", dim.apply_to("No saved settings to reset."));
            }
        }
    }

    Ok(())
}

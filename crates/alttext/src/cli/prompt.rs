//! The `alttext prompt` command for previewing prompts.

use alttext_core::{Config, PromptBuilder};
use clap::Args;

use super::setup::{setup_service, LibraryArgs};

/// Arguments for the `prompt` command.
#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Render the full prompt for this attachment instead of the instructions only
    pub id: Option<u64>,

    #[command(flatten)]
    pub library: LibraryArgs,
}

/// Execute the prompt command.
pub async fn execute(args: PromptArgs) -> anyhow::Result<()> {
    match args.id {
        Some(id) => {
            let ctx = setup_service(&args.library).await?;
            let prompt = ctx.service.pipeline().preview_prompt(id).await?;
            println!("{prompt}");
        }
        None => {
            let config = Config::load_effective()?;
            for line in PromptBuilder::new().instructions(&config.prompt) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

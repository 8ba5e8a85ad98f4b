//! The `alttext suggest` command.

use std::io::{self, BufWriter};

use alttext_core::{Caller, RecordWriter, SuggestRequest, SuggestResponse};
use clap::Args;
use console::Style;

use super::setup::{setup_service, LibraryArgs};
use super::OutputFormat;

/// Arguments for the `suggest` command.
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Attachment ids
    #[arg(required = true)]
    pub ids: Vec<u64>,

    /// Provider to use instead of `general.default_provider`
    #[arg(short, long, env = "ALTTEXT_PROVIDER")]
    pub provider: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Also print the prompt that was sent (human output only)
    #[arg(long)]
    pub show_prompt: bool,

    #[command(flatten)]
    pub library: LibraryArgs,
}

/// Execute the suggest command.
pub async fn execute(args: SuggestArgs) -> anyhow::Result<()> {
    let ctx = setup_service(&args.library).await?;
    let caller = Caller::trusted();

    let mut writer = args
        .format
        .machine()
        .map(|format| RecordWriter::new(BufWriter::new(io::stdout().lock()), format, true));
    let mut failures = 0usize;

    for &id in &args.ids {
        let request = SuggestRequest {
            subject_id: id,
            provider: args.provider.clone(),
        };
        let response = ctx.service.handle_suggest(&caller, &request).await;
        if !response.is_ok() {
            failures += 1;
        }

        match writer.as_mut() {
            Some(writer) => writer.write_suggestion(id, &response)?,
            None => print_human(id, &response, args.show_prompt),
        }
    }

    if let Some(writer) = writer {
        writer.finish()?;
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} suggestions failed", args.ids.len());
    }
    Ok(())
}

fn print_human(id: u64, response: &SuggestResponse, show_prompt: bool) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    match response {
        SuggestResponse::Ok(result) => {
            let suggestion = if result.suggestion.is_empty() {
                dim.apply_to("(decorative: empty alt)".to_string()).to_string()
            } else {
                result.suggestion.clone()
            };
            println!("{} {}", bold.apply_to(format!("#{id}")), suggestion);
            println!(
                "   {}",
                dim.apply_to(format!(
                    "provider: {}  image: {}",
                    result.provider, result.image_mode
                ))
            );
            if show_prompt {
                for line in result.prompt.lines() {
                    println!("   {}", dim.apply_to(line));
                }
            }
        }
        SuggestResponse::Err(e) => {
            let err = Style::new().for_stderr().red();
            eprintln!(
                "{} {}",
                err.apply_to(format!("#{id} failed:")),
                e.message
            );
        }
    }
}

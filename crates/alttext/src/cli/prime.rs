//! The `alttext prime` command: the upload-time autosuggest flow, on demand.

use std::io::{self, BufWriter};

use alttext_core::{PrimeOutcome, RecordWriter};
use clap::Args;
use console::Style;

use super::setup::{setup_service, LibraryArgs};
use super::OutputFormat;

/// Arguments for the `prime` command.
#[derive(Args, Debug)]
pub struct PrimeArgs {
    /// Attachment ids
    #[arg(required_unless_present = "all")]
    pub ids: Vec<u64>,

    /// Prime every attachment in the library
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub library: LibraryArgs,
}

/// Execute the prime command.
pub async fn execute(args: PrimeArgs) -> anyhow::Result<()> {
    let ctx = setup_service(&args.library).await?;

    if !ctx.service.pipeline().config().general.autosuggest_on_upload {
        tracing::warn!(
            "general.autosuggest_on_upload is off; nothing will be primed. \
             Enable it in the config file to use this command."
        );
    }

    let ids = if args.all {
        ctx.library.attachment_ids().await
    } else {
        args.ids.clone()
    };
    tracing::info!("Priming {} attachment(s)", ids.len());

    let mut writer = args
        .format
        .machine()
        .map(|format| RecordWriter::new(BufWriter::new(io::stdout().lock()), format, true));
    let mut stored = 0usize;

    for id in ids {
        let outcome = ctx.service.prime(id).await;
        if matches!(outcome, PrimeOutcome::Stored { .. }) {
            stored += 1;
        }
        match writer.as_mut() {
            Some(writer) => writer.write_prime(id, &outcome)?,
            None => print_human(id, &outcome),
        }
    }

    match writer {
        Some(writer) => {
            let summary = writer.finish()?;
            tracing::info!(
                "Primed {stored} of {} attachment(s), {} failed",
                summary.records,
                summary.failures
            );
        }
        None => {
            let dim = Style::new().for_stderr().dim();
            eprintln!("{}", dim.apply_to(format!("{stored} suggestion(s) stored")));
        }
    }
    Ok(())
}

fn print_human(id: u64, outcome: &PrimeOutcome) {
    let label = Style::new().bold().apply_to(format!("#{id}"));
    let dim = Style::new().dim();
    match outcome {
        PrimeOutcome::Disabled => println!("{label} {}", dim.apply_to("skipped (autosuggest off)")),
        PrimeOutcome::HasAltText => println!("{label} {}", dim.apply_to("skipped (has alt text)")),
        PrimeOutcome::Empty => println!("{label} {}", dim.apply_to("decorative (nothing stored)")),
        PrimeOutcome::Stored {
            suggestion,
            auto_filled,
        } => {
            let ok = Style::new().green();
            let note = if *auto_filled { "stored + alt filled" } else { "stored" };
            println!("{label} {} {suggestion}", ok.apply_to(format!("[{note}]")));
        }
        PrimeOutcome::Failed { message, .. } => {
            let err = Style::new().red();
            println!("{label} {} {message}", err.apply_to("[failed]"));
        }
    }
}

//! Machine-readable output for batch runs.
//!
//! Each processed subject becomes one record. JSON output buffers records and
//! emits a single array on [`RecordWriter::finish`]; JSON Lines streams one
//! record per line as they arrive.

use serde::Serialize;
use std::io::{self, Write};

use crate::service::{PrimeOutcome, SuggestResponse};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array of all records
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Result of one subject, tagged with its id.
#[derive(Debug, Serialize)]
pub struct SubjectRecord<'a, T: Serialize> {
    pub subject_id: u64,
    pub result: &'a T,
}

/// Counts of what a batch produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub failures: usize,
}

/// Writes per-subject records in JSON or JSONL.
pub struct RecordWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    buffered: Vec<serde_json::Value>,
    summary: BatchSummary,
}

impl<W: Write> RecordWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            buffered: Vec::new(),
            summary: BatchSummary::default(),
        }
    }

    /// Record the reply of an on-demand suggestion.
    pub fn write_suggestion(
        &mut self,
        subject_id: u64,
        response: &SuggestResponse,
    ) -> io::Result<()> {
        self.write_record(subject_id, response, !response.is_ok())
    }

    /// Record the outcome of priming.
    pub fn write_prime(&mut self, subject_id: u64, outcome: &PrimeOutcome) -> io::Result<()> {
        let failed = matches!(outcome, PrimeOutcome::Failed { .. });
        self.write_record(subject_id, outcome, failed)
    }

    fn write_record<T: Serialize>(
        &mut self,
        subject_id: u64,
        result: &T,
        failed: bool,
    ) -> io::Result<()> {
        let record = SubjectRecord { subject_id, result };
        match self.format {
            OutputFormat::Json => {
                self.buffered
                    .push(serde_json::to_value(&record).map_err(io::Error::other)?);
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.summary.records += 1;
        if failed {
            self.summary.failures += 1;
        }
        Ok(())
    }

    /// Emit anything buffered, flush, and report the counts.
    pub fn finish(mut self) -> io::Result<BatchSummary> {
        if self.format == OutputFormat::Json {
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.buffered)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &self.buffered).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.summary)
    }
}

//! Output records and writers for the `describe` command.
//!
//! JSON output collects every record into one array written on `finish`;
//! JSON Lines streams one record per line as results arrive.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::caption::AltText;
use crate::error::PipelineError;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single JSON array
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

/// Result of describing one file.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeRecord {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<AltText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,
}

/// Failure details for a record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordError {
    pub kind: String,
    pub message: String,
}

impl DescribeRecord {
    pub fn success(path: &Path, alt_text: AltText) -> Self {
        Self {
            path: path.display().to_string(),
            alt_text: Some(alt_text),
            error: None,
        }
    }

    pub fn failure(path: &Path, error: &PipelineError) -> Self {
        Self {
            path: path.display().to_string(),
            alt_text: None,
            error: Some(RecordError {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        }
    }

    /// The file could not be read from disk.
    pub fn read_failure(path: &Path, error: &io::Error) -> Self {
        Self {
            path: path.display().to_string(),
            alt_text: None,
            error: Some(RecordError {
                kind: "read_error".to_string(),
                message: error.to_string(),
            }),
        }
    }

    pub fn from_result(path: &Path, result: Result<AltText, PipelineError>) -> Self {
        match result {
            Ok(alt) => Self::success(path, alt),
            Err(e) => Self::failure(path, &e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes describe records as JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<DescribeRecord>,
    written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects the JSON array format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            written: 0,
        }
    }

    /// Record one result. JSONL writes it immediately.
    pub fn push(&mut self, record: DescribeRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.pending.push(record),
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()?;
                self.written += 1;
            }
        }
        Ok(())
    }

    /// Write any buffered records and flush.
    ///
    /// A single JSON record is written as an object, several as an array.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            let records = std::mem::take(&mut self.pending);
            let result = match records.as_slice() {
                [single] => self.write_json(single),
                many => self.write_json(&many),
            };
            result?;
            self.written += records.len();
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Records written or buffered so far.
    pub fn len(&self) -> usize {
        self.written + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }
}

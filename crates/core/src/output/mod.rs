//! Output formatting module
//!
//! The manual itself is Markdown written by [`DocWriter`]. The run tally can
//! additionally be reported on the terminal as plain text or JSON.

mod markdown;

pub use markdown::{code_block, escape_name, format_timestamp, DocWriter};

use crate::models::DocTally;
use thiserror::Error;

/// Output format errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Available report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Plain text summary
    #[default]
    Summary,
    /// JSON format
    Json,
}

/// Format the run tally in the specified format
pub fn format_report(tally: &DocTally, format: ReportFormat) -> Result<String, FormatError> {
    match format {
        ReportFormat::Summary => Ok(format_summary(tally)),
        ReportFormat::Json => serde_json::to_string_pretty(tally).map_err(FormatError::from),
    }
}

fn format_summary(tally: &DocTally) -> String {
    let mut output = String::new();

    output.push_str("Docstring Manual Results\n");
    output.push_str("========================\n\n");
    for (label, value) in tally.rows() {
        output.push_str(&format!("{}: {}\n", label, value));
    }

    output
}

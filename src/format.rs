//! Output formats for machine-readable results.
//!
//! `text` is rendered by the presenter; `json` and `csv` are produced here from
//! the structured outcomes.

use crate::outcome::{ContextListing, ListPayload, Outcome, StatusPayload};
use csv::Writer;
use serde::Serialize;
use std::str::FromStr;

pub const TEXT: &str = "text";
pub const JSON: &str = "json";
pub const CSV: &str = "csv";

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// Error when an unsupported output format is requested
    #[error("invalid output format {0}")]
    UnsupportedOutputFormat(String),
    /// Error specific to CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    /// Error when converting bytes to UTF-8 string
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
    #[error("CSV writer into inner error: {0}")]
    CsvIntoInnerError(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFormatOptions {
    pub with_headers: bool,
    pub pretty: bool,
}

/// Enum representing the supported output formats
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    /// Coloured, human-readable terminal output
    Text,
    /// JSON (JavaScript Object Notation) format
    Json(OutputFormatOptions),
    /// CSV (Comma-Separated Values) format
    Csv(OutputFormatOptions),
}

impl OutputFormat {
    /// Returns a vector of all supported format names as strings
    pub fn names() -> Vec<&'static str> {
        vec![TEXT, JSON, CSV]
    }

    pub fn from_string_with_options(
        format_str: &str,
        options: OutputFormatOptions,
    ) -> Result<OutputFormat, FormattingError> {
        match format_str.to_lowercase().as_str() {
            TEXT => Ok(OutputFormat::Text),
            JSON => Ok(OutputFormat::Json(options)),
            CSV => Ok(OutputFormat::Csv(options)),
            other => Err(FormattingError::UnsupportedOutputFormat(other.to_string())),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "{}", TEXT),
            OutputFormat::Json(_) => write!(f, "{}", JSON),
            OutputFormat::Csv(_) => write!(f, "{}", CSV),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormattingError;

    fn from_str(format_str: &str) -> Result<OutputFormat, FormattingError> {
        Self::from_string_with_options(format_str, OutputFormatOptions::default())
    }
}

/// Trait for producing CSV records from data
pub trait CsvRecordProducer {
    /// Returns the header row for the CSV output
    fn csv_header(&self) -> Vec<String>;

    /// Converts the data into CSV records
    fn as_csv_records(&self) -> Vec<Vec<String>>;

    fn to_csv(&self, with_header: bool) -> Result<String, FormattingError> {
        let mut wtr = Writer::from_writer(vec![]);
        if with_header {
            wtr.write_record(self.csv_header())?;
        }
        for record in self.as_csv_records() {
            wtr.write_record(&record)?;
        }
        Ok(String::from_utf8(wtr.into_inner()?)?)
    }
}

pub trait Formattable {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError>;
}

impl<T> Formattable for Outcome<T>
where
    T: Serialize + CsvRecordProducer,
{
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => {
                if options.pretty {
                    Ok(serde_json::to_string_pretty(self)?)
                } else {
                    Ok(serde_json::to_string(self)?)
                }
            }
            OutputFormat::Csv(options) => self.payload.to_csv(options.with_headers),
            OutputFormat::Text => Err(FormattingError::UnsupportedOutputFormat(f.to_string())),
        }
    }
}

impl CsvRecordProducer for ListPayload {
    fn csv_header(&self) -> Vec<String> {
        let columns: &[&str] = if self.verbose {
            &[
                "CONTEXT_ID",
                "CONTEXT_NAME",
                "SUBSCRIPTION_ID",
                "SUBSCRIPTION_NAME",
                "TENANT_ID",
                "USERNAME",
                "CREATED_AT",
            ]
        } else {
            &["CONTEXT_ID", "CONTEXT_NAME"]
        };
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        match &self.contexts {
            None => Vec::new(),
            Some(ContextListing::Summary(summaries)) => summaries
                .iter()
                .map(|s| vec![s.context_id.clone(), s.context_name.clone()])
                .collect(),
            Some(ContextListing::Full(contexts)) => contexts
                .iter()
                .map(|c| {
                    vec![
                        c.context_id().to_string(),
                        c.context_name().to_string(),
                        c.subscription_id().to_string(),
                        c.subscription_name().to_string(),
                        c.tenant_id().to_string(),
                        c.username().to_string(),
                        c.created_at().to_rfc3339(),
                    ]
                })
                .collect(),
        }
    }
}

impl CsvRecordProducer for StatusPayload {
    fn csv_header(&self) -> Vec<String> {
        [
            "IS_MANAGED",
            "CONTEXT_ID",
            "CONTEXT_NAME",
            "SUBSCRIPTION_ID",
            "SUBSCRIPTION_NAME",
            "TENANT_ID",
            "USERNAME",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect()
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        let Some(account) = &self.current_account else {
            return Vec::new();
        };
        vec![vec![
            self.is_managed.to_string(),
            self.context
                .as_ref()
                .map(|c| c.context_id().to_string())
                .unwrap_or_default(),
            self.context
                .as_ref()
                .map(|c| c.context_name().to_string())
                .unwrap_or_default(),
            account.id.clone(),
            account.name.clone(),
            account.tenant_id.clone(),
            account.user.name.clone(),
        ]]
    }
}

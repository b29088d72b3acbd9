use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to read a job configuration blob.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("configuration is not a JSON object: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("missing required property '{0}'")]
    MissingField(&'static str),

    #[error("property '{0}' is not a string")]
    NotAString(&'static str),
}

impl ConfigurationError {
    /// Name of the offending property, when one can be blamed.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigurationError::Malformed(_) => None,
            ConfigurationError::MissingField(field) | ConfigurationError::NotAString(field) => {
                Some(*field)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid provider base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API request to {url} failed with status: {status}")]
    Status { status: StatusCode, url: String },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// The retrieved CSV does not have the shape the projector needs.
#[derive(Error, Debug)]
pub enum SchemaMismatch {
    #[error("column '{column}' not found in response header")]
    MissingColumn { column: String },

    #[error("response is not readable as CSV: {0}")]
    Unreadable(#[source] csv::Error),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("output file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),

    #[error("write error: {0}")]
    Write(#[from] WriteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Data,
    Metadata,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Data => f.write_str("data"),
            JobKind::Metadata => f.write_str("metadata"),
        }
    }
}

/// Uniform failure surfaced to the host by a Data or Metadata job.
#[derive(Error, Debug)]
#[error("StockPrice extension {job} job failed: {source}")]
pub struct JobError {
    pub job: JobKind,
    #[source]
    pub source: AcquisitionError,
}

impl JobError {
    pub fn new(job: JobKind, source: impl Into<AcquisitionError>) -> Self {
        JobError {
            job,
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid value '{value}' for {var}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_field() {
        assert_eq!(ConfigurationError::MissingField("apikey").field(), Some("apikey"));
        assert_eq!(ConfigurationError::NotAString("enddate").field(), Some("enddate"));
    }

    #[test]
    fn test_job_error_message_identifies_component() {
        let err = JobError::new(
            JobKind::Data,
            SchemaMismatch::MissingColumn {
                column: "Adj. Close".to_string(),
            },
        );

        let message = err.to_string();
        assert!(message.starts_with("StockPrice extension data job failed"));
        assert!(message.contains("Adj. Close"));
    }
}

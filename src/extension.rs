//! Host-facing adapter around the acquisition pipeline.
//!
//! The host hands the extension an acquisition state (the info blob the
//! dialog produced) and asks for jobs. Each job runs once, from idle straight
//! to completed or failed; none of them can be cancelled.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    error::{AcquisitionError, ConfigurationError, JobError, JobKind},
    fetch::fetch_csv,
    models::{ConnectionDescription, JobConfiguration, Workflow, SELECTED_COLUMNS},
    output::{self, OutputFile},
    projection::project,
    settings::SourceSettings,
};

pub const EXTENSION_ID: &str = "stockprice-extension";

/// Host-provided environment.
#[derive(Debug, Clone)]
pub struct Environment {
    temporary_directory: PathBuf,
}

impl Environment {
    pub fn new(temporary_directory: impl Into<PathBuf>) -> Self {
        Environment {
            temporary_directory: temporary_directory.into(),
        }
    }

    pub fn temporary_directory(&self) -> &Path {
        &self.temporary_directory
    }
}

/// The raw info blob of one acquisition.
#[derive(Debug, Clone)]
pub struct AcquisitionState {
    info: String,
}

impl AcquisitionState {
    pub fn new(info: impl Into<String>) -> Self {
        AcquisitionState { info: info.into() }
    }

    pub fn info(&self) -> &str {
        &self.info
    }
}

/// Progress callback supplied by the host. Jobs accept one but never report.
pub trait Progress {
    fn report(&self, _percent: u8) {}
}

pub struct NoProgress;

impl Progress for NoProgress {}

pub struct StockPriceExtension {
    environment: Environment,
    source: SourceSettings,
}

impl StockPriceExtension {
    pub fn new(environment: Environment, source: SourceSettings) -> Self {
        StockPriceExtension {
            environment,
            source,
        }
    }

    pub fn acquisition_job_context(&self, state: AcquisitionState) -> AcquisitionJobContext<'_> {
        AcquisitionJobContext {
            extension: self,
            state,
        }
    }

    pub fn client_request_job(&self, request: impl Into<String>) -> ClientRequestJob {
        ClientRequestJob {
            request: request.into(),
        }
    }

    /// Partial enabling is not supported: every workflow is always on.
    pub fn enabled_workflows(&self, _state: &AcquisitionState) -> Vec<Workflow> {
        Workflow::ALL.to_vec()
    }

    pub fn connection_description(
        &self,
        state: &AcquisitionState,
    ) -> Result<ConnectionDescription, ConfigurationError> {
        let config = JobConfiguration::parse(state.info())?;
        Ok(ConnectionDescription::from(&config))
    }
}

pub struct AcquisitionJobContext<'a> {
    extension: &'a StockPriceExtension,
    state: AcquisitionState,
}

impl AcquisitionJobContext<'_> {
    pub fn data_job(&self) -> DataAcquisitionJob<'_> {
        DataAcquisitionJob {
            environment: &self.extension.environment,
            source: &self.extension.source,
            state: &self.state,
        }
    }

    pub fn metadata_job(&self) -> MetadataAcquisitionJob<'_> {
        MetadataAcquisitionJob { state: &self.state }
    }

    /// Called once both jobs have finished. Nothing to release.
    pub fn cleanup(&self) {}
}

/// Retrieves the price history and materializes it as a CSV file.
pub struct DataAcquisitionJob<'a> {
    environment: &'a Environment,
    source: &'a SourceSettings,
    state: &'a AcquisitionState,
}

impl DataAcquisitionJob<'_> {
    pub fn supports_cancellation(&self) -> bool {
        false
    }

    pub async fn execute(&self, _progress: &dyn Progress) -> Result<OutputFile, JobError> {
        let fail = |e: AcquisitionError| JobError::new(JobKind::Data, e);

        let config = JobConfiguration::parse(self.state.info())
            .map_err(|e| fail(e.into()))?;

        let csv_text = fetch_csv(
            self.source,
            &config.symbol,
            &config.start_date,
            &config.end_date,
            &config.api_key,
        )
        .await
        .map_err(|e| fail(e.into()))?;

        let table = project(&csv_text, &SELECTED_COLUMNS).map_err(|e| fail(e.into()))?;
        let output = output::write(&table, self.environment.temporary_directory())
            .map_err(|e| fail(e.into()))?;

        info!(
            "Acquired {} rows for {} into {}",
            table.len(),
            config.symbol,
            output.path().display()
        );

        Ok(output)
    }

    pub fn cleanup(&self) {}
}

/// Returns the document metadata stored in the acquisition state.
pub struct MetadataAcquisitionJob<'a> {
    state: &'a AcquisitionState,
}

impl MetadataAcquisitionJob<'_> {
    pub fn supports_cancellation(&self) -> bool {
        false
    }

    pub async fn execute(&self, _progress: &dyn Progress) -> Result<String, JobError> {
        let metadata = JobConfiguration::parse_metadata(self.state.info())
            .map_err(|e| JobError::new(JobKind::Metadata, e))?;

        debug!("Returning {} bytes of metadata", metadata.len());

        Ok(metadata)
    }

    pub fn cleanup(&self) {}
}

/// Liveness probe.
pub struct ClientRequestJob {
    request: String,
}

impl ClientRequestJob {
    /// `Some("pong")` for `ping`, `None` for anything else.
    pub fn execute(&self, _progress: &dyn Progress) -> Option<String> {
        match self.request.as_str() {
            "ping" => Some("pong".to_string()),
            _ => None,
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;

// Data types to receive and structure data

/// Columns taken from the provider's CSV, in output order.
pub const SELECTED_COLUMNS: [&str; 6] = [
    "Date",
    "Adj. Open",
    "Adj. High",
    "Adj. Low",
    "Adj. Close",
    "Adj. Volume",
];

/// Properties of one acquisition, parsed from the host's info blob.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfiguration {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub api_key: String,
    metadata: Option<Value>,
    pub dataset_name: Option<String>,
}

impl JobConfiguration {
    /// Parses the info blob.
    ///
    /// `stocksymbol`, `startdate`, `enddate` and `apikey` must be present as strings.
    /// `docmetadata` is only checked by [`JobConfiguration::metadata`]; a `datasetName`
    /// that is not a string is ignored. Values are kept verbatim.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let mut info: Map<String, Value> = parse_info(raw)?;

        Ok(JobConfiguration {
            symbol: required(&info, "stocksymbol")?,
            start_date: required(&info, "startdate")?,
            end_date: required(&info, "enddate")?,
            api_key: required(&info, "apikey")?,
            metadata: info.remove("docmetadata"),
            dataset_name: info
                .get("datasetName")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    /// Reads only `docmetadata` from the info blob, ignoring every other property.
    pub fn parse_metadata(raw: &str) -> Result<String, ConfigurationError> {
        required(&parse_info(raw)?, "docmetadata")
    }

    /// The `docmetadata` string exactly as supplied.
    pub fn metadata(&self) -> Result<&str, ConfigurationError> {
        match &self.metadata {
            None => Err(ConfigurationError::MissingField("docmetadata")),
            Some(Value::String(metadata)) => Ok(metadata),
            Some(_) => Err(ConfigurationError::NotAString("docmetadata")),
        }
    }
}

fn parse_info(raw: &str) -> Result<Map<String, Value>, ConfigurationError> {
    serde_json::from_str(raw).map_err(ConfigurationError::Malformed)
}

fn required(info: &Map<String, Value>, field: &'static str) -> Result<String, ConfigurationError> {
    match info.get(field) {
        None => Err(ConfigurationError::MissingField(field)),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ConfigurationError::NotAString(field)),
    }
}

/// One trading day: the six selected values in `SELECTED_COLUMNS` order.
pub type ProjectedRow = [String; 6];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedTable {
    pub headers: [String; 6],
    pub rows: Vec<ProjectedRow>,
}

impl ProjectedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    Create,
    Edit,
    Refresh,
}

impl Workflow {
    pub const ALL: [Workflow; 3] = [Workflow::Create, Workflow::Edit, Workflow::Refresh];
}

/// Entry shown by the host in its recently used list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescription {
    pub title: String,
    pub subtitle: String,
}

impl From<&JobConfiguration> for ConnectionDescription {
    fn from(config: &JobConfiguration) -> Self {
        ConnectionDescription {
            title: config
                .dataset_name
                .clone()
                .unwrap_or_else(|| config.symbol.clone()),
            subtitle: format!("{} {}..{}", config.symbol, config.start_date, config.end_date),
        }
    }
}

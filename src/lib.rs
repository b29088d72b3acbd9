pub mod error;
pub mod extension;
pub mod fetch;
pub mod models;
pub mod output;
pub mod projection;
pub mod routes;
pub mod settings;

pub use error::{AcquisitionError, JobError, JobKind};
pub use extension::{AcquisitionState, Environment, NoProgress, Progress, StockPriceExtension};
pub use models::{JobConfiguration, ProjectedRow, ProjectedTable, Workflow, SELECTED_COLUMNS};
pub use output::{OutputFile, OutputRegistry};
pub use settings::{Settings, SourceSettings};

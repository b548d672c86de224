//! Error taxonomy for loading and aggregating dashboard data.
//!
//! Every variant is fatal for the current load pass. Growth schools without
//! environment logs are not an error; see [`crate::reconcile::Reconciliation`].

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The data directory does not exist or is not a directory.
    #[error("data directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// One or both loaders produced nothing usable.
    #[error("no usable data found (environment files: {environment_schools} schools, growth workbook: {growth_schools} schools)")]
    EmptyDataset {
        environment_schools: usize,
        growth_schools: usize,
    },

    /// No school has both environment logs and growth measurements.
    #[error("no school appears in both environment and growth data")]
    NoOverlap,

    /// A source file could not be turned into records.
    #[error("malformed data in {path}: {detail}")]
    DataFormat { path: PathBuf, detail: String },

    /// Two environment files resolved to the same school under the reject policy.
    #[error("school '{school}' has more than one environment file: {first} and {second}")]
    DuplicateSchool {
        school: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The requested school is not one of the reconciled schools.
    #[error("unknown school '{0}'")]
    UnknownSchool(String),

    /// A mean was requested over zero readings.
    #[error("no {field} readings for {scope}")]
    NoReadings { scope: String, field: &'static str },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("export failed: {0}")]
    Export(String),
}

impl DashboardError {
    pub(crate) fn data_format(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        DashboardError::DataFormat {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        DashboardError::Export(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for DashboardError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        DashboardError::Export(e.to_string())
    }
}

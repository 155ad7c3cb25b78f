//! Error types for the revcast pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error belongs to.
///
/// Every kind is recoverable by the user: the stage halts, the message is
/// reported and the previous snapshot stays current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file could not be read or holds no data.
    Load,
    /// The selected columns cannot produce a usable series.
    Data,
    /// The smoothing model failed to fit or predict.
    Forecasting,
    /// Writing the CSV, chart or PDF failed.
    Export,
    /// The configuration file is unreadable or inconsistent.
    Config,
}

/// Errors that can occur anywhere in the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The file could not be opened or decoded.
    #[error("error reading file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    /// The file extension is not a supported spreadsheet type.
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The file has no header or no data rows.
    #[error("the uploaded file is empty")]
    EmptyTable,

    /// A selected column does not exist in the table.
    #[error("column '{0}' not found in the data")]
    ColumnNotFound(String),

    /// The same column was selected as date and value.
    #[error("date and value columns must be different (both are '{0}')")]
    SameColumn(String),

    /// No cell of the date column parses as a date.
    #[error("'{0}' cannot be converted to dates")]
    UnparseableDates(String),

    /// The value column holds non-numeric entries.
    #[error("'{0}' is not numeric")]
    NonNumeric(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed} data points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model fitting or prediction failed.
    #[error("forecasting error: {0}")]
    Forecasting(String),

    /// Prediction was requested before fitting.
    #[error("model must be fitted before predicting")]
    FitRequired,

    /// Writing an export artifact failed.
    #[error("export error: {0}")]
    Export(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Classify the error by pipeline stage.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unreadable { .. } | Error::UnsupportedFormat(_) | Error::EmptyTable => {
                ErrorKind::Load
            }
            Error::ColumnNotFound(_)
            | Error::SameColumn(_)
            | Error::UnparseableDates(_)
            | Error::NonNumeric(_)
            | Error::InsufficientData { .. }
            | Error::InvalidParameter(_) => ErrorKind::Data,
            Error::Forecasting(_) | Error::FitRequired => ErrorKind::Forecasting,
            Error::Export(_) => ErrorKind::Export,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn export(err: impl std::fmt::Display) -> Self {
        Error::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = Error::EmptyTable;
        assert_eq!(err.to_string(), "the uploaded file is empty");

        let err = Error::InsufficientData { needed: 6, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 6 data points, got 5"
        );

        let err = Error::SameColumn("Revenue".to_string());
        assert_eq!(
            err.to_string(),
            "date and value columns must be different (both are 'Revenue')"
        );

        let err = Error::Forecasting("optimizer diverged".to_string());
        assert_eq!(err.to_string(), "forecasting error: optimizer diverged");
    }

    #[test]
    fn errors_are_classified_by_stage() {
        assert_eq!(Error::EmptyTable.kind(), ErrorKind::Load);
        assert_eq!(
            Error::UnsupportedFormat("txt".into()).kind(),
            ErrorKind::Load
        );
        assert_eq!(Error::SameColumn("a".into()).kind(), ErrorKind::Data);
        assert_eq!(
            Error::InsufficientData { needed: 6, got: 2 }.kind(),
            ErrorKind::Data
        );
        assert_eq!(
            Error::Forecasting("x".into()).kind(),
            ErrorKind::Forecasting
        );
        assert_eq!(Error::Export("x".into()).kind(), ErrorKind::Export);
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = Error::NonNumeric("Notes".into());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}

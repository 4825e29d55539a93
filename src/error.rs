use thiserror::Error;

use crate::data::model::ColumnKind;

/// Failures raised by the table model, the imputation stages and feature
/// preparation. File-level code wraps these in `anyhow` with context.
#[derive(Debug, Error)]
pub enum Error {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' is {actual}, expected {expected}")]
    ColumnKind {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },

    #[error("column '{column}' has {actual} rows, table has {expected}")]
    RowCount {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("row {row}, column '{column}': cannot read '{value}' as {kind}")]
    Coerce {
        row: usize,
        column: String,
        value: String,
        kind: ColumnKind,
    },

    #[error("row {row}, column '{column}': '{value}' does not end in a 4-digit year")]
    MalformedSeason {
        row: usize,
        column: String,
        value: String,
    },

    #[error("statistic column '{0}' has no home_/away_ prefix")]
    UnsidedColumn(String),

    #[error("label '{label}' was not seen when the encoder was fitted")]
    UnseenLabel { label: String },

    #[error("column '{column}' ({kind}) cannot be used as a numeric feature")]
    UnsupportedFeature { column: String, kind: ColumnKind },

    #[error("row {0} has no home_team_win label")]
    MissingLabel(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

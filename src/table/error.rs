use thiserror::Error;

/// Failure to extract a value from a row for one column.
///
/// These never escape the table view: the affected cell renders a
/// placeholder and the row sorts lowest / fails filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("column `{0}` has no accessor")]
    NoAccessor(String),

    #[error("missing value: {0}")]
    Missing(String),
}

/// Errors raised while serializing rows to delimited text.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write delimited record: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush export buffer: {0}")]
    Flush(String),
}

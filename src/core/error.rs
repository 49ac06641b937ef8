use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagerError {
    #[error("No result adapter supports return shape '{0}'")]
    UnsupportedResultShape(String),
    #[error("Paging context popped without a matching push")]
    StackImbalance,
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Row mapping failed at row {index}: {message}")]
    RowMapping { index: usize, message: String },
    #[error("Row {index} has {found} cells, expected {expected}")]
    RowWidthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Export aborted: {0}")]
    ExportAborted(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

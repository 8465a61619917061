use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error types
// ---------------------------------------------------------------------------

/// Rejections raised while assembling a [`crate::data::model::Dataset`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("row {row} has {found} cells but the header has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// Failures of the playback state machine itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("dataset has no rows to play")]
    EmptyDataset,
}

/// A sink refused or failed to take a record. Never halts ticking.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("writing record: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record receiver has been dropped")]
    Disconnected,
    #[error("record receiver is full")]
    Full,
    #[error("emitter rejected record: {0}")]
    Rejected(String),
}

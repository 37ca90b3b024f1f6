//! ts-results: bounded run history and export.

pub mod buffer;
pub mod export;
pub mod record;

pub use buffer::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer, Timestamped};
pub use export::{load_jsonl, read_jsonl, save_csv, save_jsonl, write_csv, write_jsonl};
pub use record::HistoryRecord;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("History capacity must be > 0")]
    ZeroCapacity,

    #[error("Snapshot has {what} of length {len}, expected at least {expected}")]
    MalformedSnapshot {
        what: &'static str,
        len: usize,
        expected: usize,
    },
}

use thiserror::Error;

/// A record fetch that could not be completed.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Why a record was left out of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordDefect {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

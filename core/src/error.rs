use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed review record: {0}")]
    MalformedRecord(String),

    #[error("unknown check '{check}' for category {category}")]
    UnknownCheck { category: String, check: String },

    #[error("artifact index {index} out of range for {category} ({len} artifacts)")]
    ArtifactIndex {
        category: String,
        index: usize,
        len: usize,
    },

    #[error("draft not found: {0}")]
    DraftNotFound(String),

    #[error("submission requires explicit confirmation")]
    SubmissionNotConfirmed,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("time format error: {0}")]
    TimeFormat(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

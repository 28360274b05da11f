use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown disposition label '{raw}'")]
    UnknownDisposition { raw: String },

    #[error("Complaint {complaint_id} has unknown FADO type '{raw}'")]
    UnknownFadoType { complaint_id: i64, raw: String },

    #[error("Invalid date in column '{column}': '{value}'")]
    InvalidDate { column: String, value: String },

    #[error("Date {date} cannot be shifted by {months} months")]
    DateOutOfRange { date: chrono::NaiveDate, months: i32 },

    #[error("No {direction} window label for {years} year(s)")]
    UnsupportedWindow { direction: &'static str, years: u32 },

    #[error("Snapshot table '{table}' has not been written")]
    MissingSnapshot { table: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

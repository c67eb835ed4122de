use almanac_schedule::ScheduleParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlmanacError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid schedule '{name}': {source}")]
    Schedule {
        name: String,
        #[source]
        source: ScheduleParseError,
    },

    #[error("Schedule not found: {name}")]
    ScheduleNotFound { name: String },
}

impl AlmanacError {
    /// Short error code string for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            AlmanacError::Config(_) => "CONFIG_ERROR",
            AlmanacError::Schedule { source, .. } => source.kind.code(),
            AlmanacError::ScheduleNotFound { .. } => "SCHEDULE_NOT_FOUND",
        }
    }
}

pub type Result<T> = std::result::Result<T, AlmanacError>;

use thiserror::Error;

/// Errors raised at the boundary of the synthesis engine.
///
/// Infeasible targets and flat patterns are not errors: they degrade the
/// affected month and are reported through `FitStatus`.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Invalid monthly target: {0}")]
    InvalidTarget(String),

    #[error("Duplicate target for month {0}")]
    DuplicateTarget(u32),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid calendar: {0}")]
    InvalidCalendar(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type SynthResult<T> = Result<T, SynthError>;

impl From<csv::Error> for SynthError {
    fn from(err: csv::Error) -> Self {
        SynthError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for SynthError {
    fn from(err: toml::de::Error) -> Self {
        SynthError::Config(err.to_string())
    }
}

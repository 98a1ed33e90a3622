//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for capleader.
#[derive(Debug, thiserror::Error)]
pub enum CapleaderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no observations in the requested range")]
    EmptyRange,

    #[error("benchmark {ticker} has no price on {date}")]
    MissingBenchmark { ticker: String, date: NaiveDate },

    #[error("no price for {ticker} on {date}")]
    MissingPrice { ticker: String, date: NaiveDate },

    #[error("every candidate market cap is the sentinel on {date}")]
    AllCandidatesSentinel { date: NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CapleaderError> for std::process::ExitCode {
    fn from(err: &CapleaderError) -> Self {
        let code: u8 = match err {
            CapleaderError::Io(_) => 1,
            CapleaderError::ConfigParse { .. }
            | CapleaderError::ConfigMissing { .. }
            | CapleaderError::ConfigInvalid { .. } => 2,
            CapleaderError::Data { .. } => 3,
            CapleaderError::EmptyRange => 4,
            CapleaderError::MissingBenchmark { .. }
            | CapleaderError::MissingPrice { .. }
            | CapleaderError::AllCandidatesSentinel { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

//! Domain error types.

/// Top-level error type for smacross.
#[derive(Debug, thiserror::Error)]
pub enum SmacrossError {
    #[error("invalid configuration: {parameter}: {reason}")]
    Configuration { parameter: String, reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("data integrity error at index {index}: {reason}")]
    DataIntegrity { index: usize, reason: String },

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

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SmacrossError {
    pub(crate) fn configuration(parameter: &str, reason: impl Into<String>) -> Self {
        SmacrossError::Configuration {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data_integrity(index: usize, reason: impl Into<String>) -> Self {
        SmacrossError::DataIntegrity {
            index,
            reason: reason.into(),
        }
    }
}

impl From<&SmacrossError> for std::process::ExitCode {
    fn from(err: &SmacrossError) -> Self {
        let code: u8 = match err {
            SmacrossError::Io(_) => 1,
            SmacrossError::Configuration { .. }
            | SmacrossError::ConfigParse { .. }
            | SmacrossError::ConfigMissing { .. }
            | SmacrossError::ConfigInvalid { .. } => 2,
            SmacrossError::Data { .. } => 3,
            SmacrossError::DataIntegrity { .. } => 4,
            SmacrossError::NoData { .. } | SmacrossError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

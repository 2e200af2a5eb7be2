//! Domain error types.

/// Top-level error type for signalsim.
///
/// A declined position size is not an error; see
/// [`Sizing::NoTrade`](crate::domain::risk::Sizing).
#[derive(Debug, thiserror::Error)]
pub enum SignalsimError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("dimension mismatch: {bars} bars but {values} signal values")]
    DimensionMismatch { bars: usize, values: usize },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("bad bar series: {reason}")]
    BadSeries { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SignalsimError> for std::process::ExitCode {
    fn from(err: &SignalsimError) -> Self {
        let code: u8 = match err {
            SignalsimError::Io(_) => 1,
            SignalsimError::ConfigParse { .. }
            | SignalsimError::ConfigMissing { .. }
            | SignalsimError::ConfigInvalid { .. } => 2,
            SignalsimError::Data { .. } | SignalsimError::BadSeries { .. } => 3,
            SignalsimError::InsufficientData { .. } | SignalsimError::DimensionMismatch { .. } => 4,
            SignalsimError::InvalidConfiguration { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

//! Domain error types.

/// Top-level error type for tradesim.
///
/// Lookback gaps and empty inputs are not errors: the engine represents them
/// as undefined indicator values and the "No data" outcome respectively.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("malformed bar data: {reason}")]
    DataFormat { reason: String },

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

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TradesimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TradesimError::ConfigParse { .. }
                | TradesimError::ConfigMissing { .. }
                | TradesimError::ConfigInvalid { .. }
        )
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => 2,
            TradesimError::Database { .. } | TradesimError::DatabaseQuery { .. } => 3,
            TradesimError::DataFormat { .. } | TradesimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

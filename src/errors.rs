use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The aggregator answered but reported an error in the payload
    #[error("Aggregator error: {0}")]
    Aggregator(String),

    #[error("Invalid amount: {0}")]
    Amount(String),

    #[error("{0}")]
    Validation(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Settlement error: {0}")]
    Settlement(String),
}

impl AppError {
    #[allow(clippy::needless_pass_by_value)]
    pub fn config<T: ToString>(e: T) -> Self {
        Self::Config(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn http<T: ToString>(e: T) -> Self {
        Self::Http(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn parse<T: ToString>(e: T) -> Self {
        Self::Parse(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn aggregator<T: ToString>(e: T) -> Self {
        Self::Aggregator(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn amount<T: ToString>(e: T) -> Self {
        Self::Amount(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn validation<T: ToString>(e: T) -> Self {
        Self::Validation(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn wallet<T: ToString>(e: T) -> Self {
        Self::Wallet(e.to_string())
    }

    #[allow(clippy::needless_pass_by_value)]
    pub fn settlement<T: ToString>(e: T) -> Self {
        Self::Settlement(e.to_string())
    }

    /// Short text suitable for an inline status line
    pub fn reason(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Aggregator(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::http(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::parse(e)
    }
}

impl From<url::ParseError> for AppError {
    fn from(e: url::ParseError) -> Self {
        AppError::config(e)
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(e: base64::DecodeError) -> Self {
        AppError::parse(format!("base64: {e}"))
    }
}

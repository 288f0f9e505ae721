use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssignError {
    #[error("Oracle request failed: {message}")]
    OracleError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Stage '{stage}' cannot run in phase {phase}")]
    StageOrderError { stage: String, phase: String },
}

impl AssignError {
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::OracleError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// 給終端使用者看的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::OracleError { .. } | Self::ApiError(_) => {
                "The assignment oracle could not be reached".to_string()
            }
            Self::IoError(e) => format!("Could not read input file: {}", e),
            Self::SerializationError(_) => "Input data is not valid JSON".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::ValidationError { message } => format!("Invalid input: {}", message),
            Self::StageOrderError { .. } => "Internal pipeline ordering error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::OracleError { .. } | Self::ApiError(_) => {
                "Check OPENAI_BASE_URL, OPENAI_API_KEY and network connectivity"
            }
            Self::IoError(_) => "Make sure the roster file exists and is readable",
            Self::SerializationError(_) | Self::ConfigError { .. } => {
                "Check the roster file syntax against roster.example.toml"
            }
            Self::InvalidConfigValueError { .. } => {
                "Fix the named setting in the roster file, environment or CLI flags"
            }
            Self::ValidationError { .. } => {
                "Provide a student name and personality, and unique dormitory/room names"
            }
            Self::StageOrderError { .. } => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, AssignError>;

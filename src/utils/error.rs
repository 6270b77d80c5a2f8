use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("Speech recognition is not supported on this device")]
    UnsupportedDevice,

    #[error("Interpretation service unreachable: {message}")]
    NetworkError { message: String },

    #[error("Malformed interpretation reply: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Interpretation reply violates contract: {message}")]
    ContractError { message: String },

    #[error("Speech recognition failed: {code}")]
    RecognitionError { code: String },

    #[error("Menu item {id} not found")]
    NotFound { id: u32 },

    #[error("Order is empty")]
    EmptyOrder,

    #[error("Quantity {quantity} out of range ({min}..={max})")]
    InvalidQuantity { quantity: u32, min: u32, max: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

impl From<reqwest::Error> for KioskError {
    fn from(err: reqwest::Error) -> Self {
        KioskError::NetworkError {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Device,
    Interpretation,
    Recognition,
    Order,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl KioskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KioskError::UnsupportedDevice => ErrorCategory::Device,
            KioskError::NetworkError { .. }
            | KioskError::ParseError(_)
            | KioskError::ContractError { .. } => ErrorCategory::Interpretation,
            KioskError::RecognitionError { .. } => ErrorCategory::Recognition,
            KioskError::NotFound { .. }
            | KioskError::EmptyOrder
            | KioskError::InvalidQuantity { .. } => ErrorCategory::Order,
            KioskError::ConfigError { .. }
            | KioskError::ConfigValidationError { .. }
            | KioskError::InvalidConfigValueError { .. }
            | KioskError::MissingConfigError { .. } => ErrorCategory::Configuration,
            KioskError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Order => ErrorSeverity::Low,
            ErrorCategory::Interpretation | ErrorCategory::Recognition => ErrorSeverity::Medium,
            ErrorCategory::Device | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether a voice session can simply be retried after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Interpretation | ErrorCategory::Recognition | ErrorCategory::Order
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            KioskError::UnsupportedDevice => "Use the menu tiles; voice ordering is disabled on this device",
            KioskError::NetworkError { .. } => "Check that the interpretation service is running and reachable",
            KioskError::ParseError(_) | KioskError::ContractError { .. } => {
                "Check the interpretation service version; it must reply with an order_items object"
            }
            KioskError::RecognitionError { .. } => "Try speaking again closer to the microphone",
            KioskError::NotFound { .. } => "Reload the menu catalog",
            KioskError::EmptyOrder => "Add at least one menu item before checking out",
            KioskError::InvalidQuantity { .. } => "Choose a quantity between 1 and 99",
            KioskError::IoError(_) => "Check file permissions and disk space",
            KioskError::ConfigError { .. }
            | KioskError::ConfigValidationError { .. }
            | KioskError::InvalidConfigValueError { .. }
            | KioskError::MissingConfigError { .. } => "Fix the kiosk configuration file and restart",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            KioskError::UnsupportedDevice => "이 기기는 음성 인식을 지원하지 않습니다.".to_string(),
            KioskError::EmptyOrder => "주문할 메뉴를 선택해주세요.".to_string(),
            KioskError::InvalidQuantity { min, max, .. } => {
                format!("수량은 {}개에서 {}개 사이로 선택해주세요.", min, max)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpretation_errors_are_recoverable() {
        let errors = [
            KioskError::NetworkError {
                message: "refused".to_string(),
            },
            KioskError::ContractError {
                message: "missing order_items".to_string(),
            },
            KioskError::RecognitionError {
                code: "no-speech".to_string(),
            },
        ];
        for err in errors {
            assert!(err.is_recoverable(), "{err} should be recoverable");
            assert_eq!(err.severity(), ErrorSeverity::Medium);
        }
    }

    #[test]
    fn test_unsupported_device_is_not_recoverable() {
        let err = KioskError::UnsupportedDevice;
        assert_eq!(err.category(), ErrorCategory::Device);
        assert!(!err.is_recoverable());
        assert!(err.user_friendly_message().contains("음성 인식"));
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("NetworkError: {message}")]
    Network { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl HubError {
    /// 將 reqwest 錯誤轉換為可分類的錯誤
    ///
    /// The request URL never reaches the rendered message, so ids or ports
    /// containing `429` cannot change how the failure is classified.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            HubError::Network {
                message: err.without_url().to_string(),
            }
        } else if let Some(status) = err.status() {
            HubError::HttpStatus {
                status,
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            HubError::ApiError(err.without_url())
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HubError::HttpStatus { status, .. } if *status == reqwest::StatusCode::NOT_FOUND)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HubError::ApiError(_) => "The content API request failed".to_string(),
            HubError::HttpStatus { status, url } => {
                format!("The content API answered {} for {}", status, url)
            }
            HubError::Network { .. } => "Network connection failed".to_string(),
            HubError::IoError(e) => format!("File access failed: {}", e),
            HubError::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            HubError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HubError::ApiError(_) | HubError::HttpStatus { .. } | HubError::Network { .. } => {
                "Check --api-base-url and try again later"
            }
            HubError::IoError(_) => "Make sure the file exists and is readable",
            HubError::TomlError(_) => "Fix the syntax in the configuration file",
            HubError::InvalidConfigValueError { .. } => "Review the configuration values",
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

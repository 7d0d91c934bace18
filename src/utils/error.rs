use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Geocoding request rejected with status {status}: {message}")]
    GeocodingError { status: String, message: String },

    #[error("Geocoding returned no results for ({lat}, {lng})")]
    NoResultsError { lat: f64, lng: f64 },

    #[error("Unknown place: {id}")]
    UnknownPlaceError { id: String },

    #[error("Place identifier already in use: {id}")]
    DuplicatePlaceError { id: String },
}

impl BoardError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BoardError::HttpError(_) => "無法連線至地理編碼服務".to_string(),
            BoardError::IoError(e) => format!("檔案讀寫失敗: {}", e),
            BoardError::SerializationError(_) => "服務回應格式無法解析".to_string(),
            BoardError::ConfigError { message } => format!("配置錯誤: {}", message),
            BoardError::InvalidConfigValueError { field, reason, .. } => {
                format!("配置欄位 '{}' 無效: {}", field, reason)
            }
            BoardError::GeocodingError { status, .. } => {
                format!("地理編碼服務拒絕請求 ({})", status)
            }
            BoardError::NoResultsError { .. } => "找不到該位置的地址".to_string(),
            BoardError::UnknownPlaceError { id } => format!("找不到地點 '{}'", id),
            BoardError::DuplicatePlaceError { id } => format!("地點 '{}' 已存在", id),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BoardError::HttpError(_) => "Check network connectivity and the geocoding endpoint",
            BoardError::IoError(_) => "Make sure the file exists and is readable",
            BoardError::SerializationError(_) => "Verify the endpoint speaks the Geocoding JSON API",
            BoardError::ConfigError { .. }
            | BoardError::InvalidConfigValueError { .. } => "Fix the configuration file or CLI flags",
            BoardError::GeocodingError { .. } => "Check that the geocoding API key is valid",
            BoardError::NoResultsError { .. } => "Try a position on land or closer to a road",
            BoardError::UnknownPlaceError { .. } => "Use one of the listed place identifiers",
            BoardError::DuplicatePlaceError { .. } => "Choose an unused place identifier",
        }
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

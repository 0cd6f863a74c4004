use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Geocoding request failed: {0}")]
    GeocodingApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid bounding box '{input}': {reason}")]
    BoundingBoxError { input: String, reason: String },

    #[error("Attribute decode error: {reason}")]
    AttributeDecodeError { reason: String },

    #[error("Schedule decode error: {reason}")]
    ScheduleDecodeError { reason: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Geocoding,
    Storage,
    Decode,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Degraded-but-handled: discovery keeps working with reduced filters.
    Low,
    /// Transient, worth retrying (network, upstream provider).
    Medium,
    /// Bad input data or configuration; needs operator action.
    High,
    /// Environment failure (filesystem, runtime).
    Critical,
}

impl DiscoveryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::GeocodingApiError(_) => ErrorCategory::Geocoding,
            Self::CsvError(_) | Self::SerializationError(_) | Self::StorageError { .. } => {
                ErrorCategory::Storage
            }
            Self::BoundingBoxError { .. }
            | Self::AttributeDecodeError { .. }
            | Self::ScheduleDecodeError { .. } => ErrorCategory::Decode,
            Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Config,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BoundingBoxError { .. }
            | Self::AttributeDecodeError { .. }
            | Self::ScheduleDecodeError { .. } => ErrorSeverity::Low,
            Self::GeocodingApiError(_) => ErrorSeverity::Medium,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::StorageError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::GeocodingApiError(_) => {
                "Check network connectivity and the geocoder endpoint, then retry".to_string()
            }
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check that the provider data file is well-formed".to_string()
            }
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::BoundingBoxError { .. } => {
                "Expected 'minLng,minLat,maxLng,maxLat' with coordinates in range".to_string()
            }
            Self::AttributeDecodeError { .. } | Self::ScheduleDecodeError { .. } => {
                "The stored blob uses an unknown encoding; the record is served degraded"
                    .to_string()
            }
            Self::StorageError { .. } => {
                "Check that the provider store is reachable and readable".to_string()
            }
            Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field }
            | Self::ConfigValidationError { field, .. } => {
                format!("Fix the '{}' configuration value and run again", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::GeocodingApiError(_) => "Could not reach the geocoding service".to_string(),
            Self::CsvError(_) | Self::SerializationError(_) | Self::StorageError { .. } => {
                "Provider data could not be read".to_string()
            }
            Self::IoError(e) => format!("File system error: {}", e),
            Self::BoundingBoxError { input, .. } => {
                format!("'{}' is not a usable map viewport", input)
            }
            Self::AttributeDecodeError { .. } => "Stored attributes are malformed".to_string(),
            Self::ScheduleDecodeError { .. } => "Stored schedule is malformed".to_string(),
            Self::InvalidConfigValueError { field, value, .. } => {
                format!("Configuration value '{}' is invalid for {}", value, field)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

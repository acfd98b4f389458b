//! Error types for dominant color extraction

use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractionError>;

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Bad arguments: k < 1, empty image, or an invalid configuration
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Not enough qualifying pixels to form the requested clusters
    #[error("Insufficient data: {available} usable pixel colors for {requested} clusters")]
    InsufficientData { available: usize, requested: usize },

    /// Image bytes or file could not be decoded
    #[error("Failed to load image: {message}")]
    ImageDecode {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Palette strip could not be encoded
    #[error("Failed to encode image: {message}")]
    Encode {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },
}

impl ExtractionError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn image_decode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::ImageDecode {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn encode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::Encode {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Whether the caller can retry with a smaller k or without filtering
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExtractionError::InsufficientData { .. })
    }

    /// Short message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::InsufficientData { available, requested } => format!(
                "The image has only {available} usable colors but {requested} were requested. \
                 Try fewer colors or an image with more variation."
            ),
            ExtractionError::ImageDecode { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            ExtractionError::InvalidInput { reason } => format!("Invalid request: {reason}"),
            ExtractionError::Config { message, .. } => {
                format!("Could not use the configuration: {message}")
            }
            ExtractionError::Encode { .. } => {
                "Could not render the palette image.".to_string()
            }
        }
    }
}

use thiserror::Error;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter text or URL to generate a QR code.";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate QR code. Try again.";
pub const RENDER_FAILED_MESSAGE: &str = "Failed to load generated image.";

/// Everything that can go wrong between a Generate press and a rendered image.
///
/// None of these are fatal: each one ends up as a single error status line
/// and the form is ready for another attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    #[error("no text or URL to encode")]
    EmptyInput,

    #[error("invalid QR service endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Non-2xx status, or the request never got a response (`status` is `None`).
    #[error("network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Guards against an error page served with a 200.
    #[error("invalid response (not an image), content type {content_type:?}")]
    InvalidPayload { content_type: String },

    #[error("generated image could not be decoded: {0}")]
    Render(String),
}

impl QrError {
    pub fn network_status(status: u16) -> Self {
        Self::Network {
            status: Some(status),
            message: format!("Network error {status}"),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// The status line shown for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyInput => EMPTY_INPUT_MESSAGE,
            Self::Render(_) => RENDER_FAILED_MESSAGE,
            Self::InvalidEndpoint { .. } | Self::Network { .. } | Self::InvalidPayload { .. } => {
                GENERATION_FAILED_MESSAGE
            }
        }
    }
}

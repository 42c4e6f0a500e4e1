use thiserror::Error;

use crate::frame_catalog::FrameCatalogError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to connect to frame server at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}", render_server_error(.status, .message, .details, .show_details))]
    Server {
        status: u16,
        error_type: String,
        message: String,
        details: Option<String>,
        /// Copied from the session config; controls whether `details` is displayed
        show_details: bool,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidInput(#[from] FrameCatalogError),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

fn render_server_error(
    status: &u16,
    message: &str,
    details: &Option<String>,
    show_details: &bool,
) -> String {
    match details {
        Some(details) if *show_details => {
            format!("Server error ({}): {}\n  Details: {}", status, message, details)
        }
        _ => format!("Server error ({}): {}", status, message),
    }
}

impl ClientError {
    /// Error kind reported by the server, if the server rejected the request
    pub fn error_type(&self) -> Option<&str> {
        match self {
            ClientError::Server { error_type, .. } => Some(error_type.as_str()),
            _ => None,
        }
    }

    pub fn is_duplicate_name(&self) -> bool {
        self.error_type() == Some("DuplicateName")
            || matches!(
                self,
                ClientError::InvalidInput(FrameCatalogError::DuplicateName { .. })
            )
    }

    pub fn is_not_found(&self) -> bool {
        self.error_type() == Some("FrameNotFound")
    }
}

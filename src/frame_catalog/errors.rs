//! # Frame Catalog Error Types
//!
//! Errors raised while validating frame names and schemas, loading delimited
//! source files, and mutating the frame registry.
//!
//! Every variant has a stable `error_type` string and an HTTP status so the
//! server can report it and the client can classify it again on the other
//! side of the wire.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameCatalogError {
    #[error("Invalid frame name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("A frame named `{name}` already exists")]
    DuplicateName { name: String },
    #[error("No frame found for {key}")]
    FrameNotFound { key: String },
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },
    #[error("Invalid value `{raw}` for column `{column}` of type {data_type}")]
    InvalidValue {
        column: String,
        data_type: String,
        raw: String,
    },
    #[error("Invalid source: {message}")]
    InvalidSource { message: String },
    #[error("Source file not found: {path}")]
    SourceNotFound { path: String },
    #[error("Failed to read source file {path}: {error}")]
    SourceRead { path: String, error: String },
}

impl FrameCatalogError {
    pub fn frame_id_not_found(id: u64) -> Self {
        FrameCatalogError::FrameNotFound {
            key: format!("id {}", id),
        }
    }

    pub fn frame_name_not_found(name: impl Into<String>) -> Self {
        FrameCatalogError::FrameNotFound {
            key: format!("name `{}`", name.into()),
        }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FrameCatalogError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Stable identifier reported as `error_type` in HTTP error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            FrameCatalogError::InvalidName { .. } => "InvalidName",
            FrameCatalogError::DuplicateName { .. } => "DuplicateName",
            FrameCatalogError::FrameNotFound { .. } => "FrameNotFound",
            FrameCatalogError::InvalidSchema { .. } => "InvalidSchema",
            FrameCatalogError::InvalidValue { .. } => "InvalidValue",
            FrameCatalogError::InvalidSource { .. } => "InvalidSource",
            FrameCatalogError::SourceNotFound { .. } => "SourceNotFound",
            FrameCatalogError::SourceRead { .. } => "SourceRead",
        }
    }

    /// HTTP status code used when this error crosses the API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            FrameCatalogError::InvalidName { .. }
            | FrameCatalogError::InvalidSchema { .. }
            | FrameCatalogError::InvalidValue { .. }
            | FrameCatalogError::InvalidSource { .. } => 400,
            FrameCatalogError::FrameNotFound { .. } | FrameCatalogError::SourceNotFound { .. } => {
                404
            }
            FrameCatalogError::DuplicateName { .. } => 409,
            FrameCatalogError::SourceRead { .. } => 500,
        }
    }
}

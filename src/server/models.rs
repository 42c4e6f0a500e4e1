//! Request and response bodies of the HTTP API, shared with the client

use serde::{Deserialize, Serialize};

use crate::frame_catalog::{CsvFile, FrameInfo};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFrameRequest {
    /// Unnamed frames are allowed; they are absent from the name listing
    pub name: Option<String>,
    pub source: CsvFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFrameRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TakeRowsQuery {
    pub offset: Option<usize>,
    /// Defaults to the server's max_take_rows and is capped by it
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameListResponse {
    pub frames: Vec<FrameInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameNamesResponse {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DropFrameResponse {
    pub dropped: u64,
    pub name: Option<String>,
}

/// Rows of a frame; cells are plain JSON scalars
#[derive(Debug, Serialize, Deserialize)]
pub struct FrameRowsResponse {
    pub columns: Vec<String>,
    pub offset: usize,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,

    /// Error kind: "DuplicateName", "FrameNotFound", "InvalidSchema", ...
    pub error_type: String,

    /// Operation context and full error structure, shown by clients that ask for details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

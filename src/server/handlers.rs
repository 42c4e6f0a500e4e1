use std::sync::Arc;

use axum::{
    body,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::frame_catalog::{FrameCatalogError, FrameInfo, FrameRows};

use super::{
    models::{
        CreateFrameRequest, DropFrameResponse, ErrorBody, FrameListResponse, FrameNamesResponse,
        RenameFrameRequest, TakeRowsQuery,
    },
    AppState,
};

pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Convert a catalog error into an HTTP error, keeping the operation as detail
fn catalog_error(operation: &str, error: FrameCatalogError) -> ApiError {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        log::error!("{} failed: {}", operation, error);
    } else {
        log::debug!("{} rejected: {}", operation, error);
    }

    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            error_type: error.error_type().to_string(),
            details: Some(format!("{}: {:?}", operation, error)),
        }),
    )
}

/// Error body for a request whose path, query or JSON body could not be extracted
fn rejection_error(
    operation: &str,
    error_type: &str,
    status: StatusCode,
    message: String,
) -> ApiError {
    log::debug!("{} rejected ({}): {}", operation, status, message);
    let error_type = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "PayloadTooLarge"
    } else {
        error_type
    };

    (
        status,
        Json(ErrorBody {
            details: Some(format!("{}: {}", operation, message)),
            error: message,
            error_type: error_type.to_string(),
        }),
    )
}

/// `data_error_type` classifies well-formed JSON that does not fit the request type
fn json_rejection(operation: &str, data_error_type: &str, rejection: JsonRejection) -> ApiError {
    let error_type = match rejection {
        JsonRejection::JsonDataError(_) => data_error_type,
        _ => "InvalidRequest",
    };
    rejection_error(operation, error_type, rejection.status(), rejection.body_text())
}

fn path_rejection(operation: &str, rejection: PathRejection) -> ApiError {
    rejection_error(operation, "InvalidRequest", rejection.status(), rejection.body_text())
}

fn query_rejection(operation: &str, rejection: QueryRejection) -> ApiError {
    rejection_error(operation, "InvalidRequest", rejection.status(), rejection.body_text())
}

fn error_type_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::METHOD_NOT_ALLOWED => "MethodNotAllowed",
        StatusCode::REQUEST_TIMEOUT => "Timeout",
        StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLarge",
        s if s.is_server_error() => "Internal",
        _ => "InvalidRequest",
    }
}

/// Rewrite error responses produced outside the handlers (unknown routes,
/// timeouts, body limit, panics) into an [`ErrorBody`]
pub async fn json_error_response(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let text = match body::to_bytes(response.into_body(), 64 * 1024).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };
    let error = if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        text
    };
    if status.is_server_error() {
        log::error!("Request failed with {}: {}", status, error);
    }

    (
        status,
        Json(ErrorBody {
            error,
            error_type: error_type_for_status(status).to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// Simple health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "frameserver",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn list_frames_handler(State(app_state): State<Arc<AppState>>) -> Json<FrameListResponse> {
    let frames = app_state.registry.list_frames().await;
    log::debug!("Listing {} frames", frames.len());
    Json(FrameListResponse { frames })
}

pub async fn frame_names_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<FrameNamesResponse> {
    Json(FrameNamesResponse {
        names: app_state.registry.frame_names().await,
    })
}

pub async fn create_frame_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateFrameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FrameInfo>), ApiError> {
    let Json(payload) = payload.map_err(|e| json_rejection("create frame", "InvalidSchema", e))?;
    log::debug!(
        "Create frame {:?} from {} ({} columns)",
        payload.name,
        payload.source.path,
        payload.source.schema.len()
    );

    let info = app_state
        .registry
        .create_frame(payload.name, &payload.source)
        .await
        .map_err(|e| catalog_error("create frame", e))?;
    Ok((StatusCode::CREATED, Json(info)))
}

pub async fn get_frame_handler(
    State(app_state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<FrameInfo>, ApiError> {
    let Path(id) = id.map_err(|e| path_rejection("get frame", e))?;
    app_state
        .registry
        .get_frame(id)
        .await
        .map(Json)
        .map_err(|e| catalog_error("get frame", e))
}

pub async fn get_frame_by_name_handler(
    State(app_state): State<Arc<AppState>>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<FrameInfo>, ApiError> {
    let Path(name) = name.map_err(|e| path_rejection("get frame by name", e))?;
    app_state
        .registry
        .get_frame_by_name(&name)
        .await
        .map(Json)
        .map_err(|e| catalog_error("get frame by name", e))
}

pub async fn rename_frame_handler(
    State(app_state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<RenameFrameRequest>, JsonRejection>,
) -> Result<Json<FrameInfo>, ApiError> {
    let Path(id) = id.map_err(|e| path_rejection("rename frame", e))?;
    let Json(payload) = payload.map_err(|e| json_rejection("rename frame", "InvalidRequest", e))?;
    log::debug!("Rename frame {} to {}", id, payload.name);
    app_state
        .registry
        .rename_frame(id, &payload.name)
        .await
        .map(Json)
        .map_err(|e| catalog_error("rename frame", e))
}

pub async fn drop_frame_handler(
    State(app_state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DropFrameResponse>, ApiError> {
    let Path(id) = id.map_err(|e| path_rejection("drop frame", e))?;
    let info = app_state
        .registry
        .drop_frame(id)
        .await
        .map_err(|e| catalog_error("drop frame", e))?;
    Ok(Json(DropFrameResponse {
        dropped: info.id,
        name: info.name,
    }))
}

pub async fn take_rows_handler(
    State(app_state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
    query: Result<Query<TakeRowsQuery>, QueryRejection>,
) -> Result<Json<FrameRows>, ApiError> {
    let Path(id) = id.map_err(|e| path_rejection("take rows", e))?;
    let Query(query) = query.map_err(|e| query_rejection("take rows", e))?;
    let max = app_state.config.max_take_rows;
    let count = query.count.unwrap_or(max).min(max);
    let offset = query.offset.unwrap_or(0);

    app_state
        .registry
        .take_rows(id, offset, count)
        .await
        .map(Json)
        .map_err(|e| catalog_error("take rows", e))
}

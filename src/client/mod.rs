//! Client library for the frame server
//!
//! All session options (server address, error detail, API logging) live in a
//! [`ClientConfig`] that is handed to [`Session::connect`]. Nothing is kept in
//! process-wide state, so many sessions with different options can run side
//! by side, e.g. in parallel tests.
//!
//! ```ignore
//! let session = Session::connect(ClientConfig::default().with_port(19099)).await?;
//! let source = CsvFile::new("/datasets/classification-compute.csv", schema)
//!     .with_skip_header_lines(1);
//! let mut frame = session.create_frame(source, Some("test_frame_rename")).await?;
//! frame.set_name("test_frame_new_name").await?;
//! assert!(session.get_frame_names().await?.contains(&"test_frame_new_name".to_string()));
//! ```

use std::env;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::frame_catalog::{validate_frame_name, CsvFile, FrameInfo};
use crate::server::models::{
    CreateFrameRequest, ErrorBody, FrameListResponse, FrameNamesResponse,
};

pub mod errors;
pub mod frame;

pub use errors::ClientError;
pub use frame::Frame;

pub const DEFAULT_PORT: u16 = 9099;

/// Log target for per-call API logging
pub const API_LOG_TARGET: &str = "frameserver::api";

/// Session options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Include server-side error details when displaying errors
    pub show_details: bool,
    /// Log every API call at info level (otherwise trace)
    pub log_api: bool,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            show_details: false,
            log_api: false,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `FRAMESERVER_HOST` and `FRAMESERVER_PORT`
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = ClientConfig::default();
        if let Ok(host) = env::var("FRAMESERVER_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("FRAMESERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ClientError::Config(format!("FRAMESERVER_PORT={}: {}", port, e)))?;
        }
        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_show_details(mut self, show_details: bool) -> Self {
        self.show_details = show_details;
        self
    }

    pub fn with_api_logging(mut self, log_api: bool) -> Self {
        self.log_api = log_api;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Level of the per-call API log line
fn api_log_level(log_api: bool) -> log::Level {
    if log_api {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

/// A connection to one frame server
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    config: ClientConfig,
    base_url: String,
}

impl Session {
    /// Build the HTTP client and check that the server answers its health endpoint
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        if config.port == 0 {
            return Err(ClientError::Config("port cannot be 0".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.base_url();
        let session = Session {
            http,
            config,
            base_url,
        };

        let response = session
            .request(Method::GET, "/health")
            .send()
            .await
            .map_err(|source| ClientError::Connection {
                url: session.base_url.clone(),
                source,
            })?;
        session.decode::<serde_json::Value>(response).await?;

        log::info!("Connected to frame server at {}", session.base_url);
        Ok(session)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of all named frames on the server. No ordering is guaranteed.
    pub async fn get_frame_names(&self) -> Result<Vec<String>, ClientError> {
        let response: FrameNamesResponse = self.call(Method::GET, "/frames/names").await?;
        Ok(response.names)
    }

    pub async fn list_frames(&self) -> Result<Vec<FrameInfo>, ClientError> {
        let response: FrameListResponse = self.call(Method::GET, "/frames").await?;
        Ok(response.frames)
    }

    /// Handle to an existing frame by name
    pub async fn get_frame(&self, name: &str) -> Result<Frame, ClientError> {
        validate_frame_name(name)?;
        let info: FrameInfo = self
            .call(Method::GET, &format!("/frames/by-name/{}", name))
            .await?;
        Ok(Frame::new(self.clone(), info))
    }

    /// Create a frame on the server from a delimited file
    pub async fn create_frame(
        &self,
        source: CsvFile,
        name: Option<&str>,
    ) -> Result<Frame, ClientError> {
        source.validate()?;
        if let Some(name) = name {
            validate_frame_name(name)?;
        }

        let body = CreateFrameRequest {
            name: name.map(str::to_string),
            source,
        };
        let response = self.request(Method::POST, "/frames").json(&body).send().await?;
        let info: FrameInfo = self.decode(response).await?;
        Ok(Frame::new(self.clone(), info))
    }

    /// Drop frames by name. Names that do not exist are skipped; returns how
    /// many frames were dropped.
    pub async fn drop_frames(&self, names: &[&str]) -> Result<usize, ClientError> {
        let mut dropped = 0;
        for name in names {
            match self.get_frame(name).await {
                Ok(frame) => match frame.drop_frame().await {
                    Ok(()) => dropped += 1,
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                },
                Err(e) if e.is_not_found() => {
                    log::debug!("Frame {} not found, nothing to drop", name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(dropped)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        log::log!(
            target: API_LOG_TARGET,
            api_log_level(self.config.log_api),
            "[API] {} {}",
            method,
            path
        );
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = self.request(method, path).send().await?;
        self.decode(response).await
    }

    /// Decode a success body, or turn an error body into `ClientError::Server`
    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            let url = response.url().to_string();
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|source| ClientError::Decode { url, source });
        }

        let text = response.text().await?;
        let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| ErrorBody {
            error: if text.is_empty() {
                status.to_string()
            } else {
                text.clone()
            },
            error_type: "Http".to_string(),
            details: None,
        });

        if self.config.log_api {
            log::warn!(
                target: API_LOG_TARGET,
                "[API] request failed with {}: {}",
                status,
                body.error
            );
        }

        Err(ClientError::Server {
            status: status.as_u16(),
            error_type: body.error_type,
            message: body.error,
            details: body.details,
            show_details: self.config.show_details,
        })
    }
}

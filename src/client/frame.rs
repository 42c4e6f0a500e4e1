use reqwest::Method;

use crate::frame_catalog::{validate_frame_name, FrameInfo, FrameSchema};
use crate::server::models::{DropFrameResponse, FrameRowsResponse, RenameFrameRequest};

use super::{ClientError, Session};

/// Client-side handle to a frame on the server.
///
/// Holds the last known summary of the frame. `name()`, `schema()` and
/// `row_count()` read that cached summary; `refresh()` re-reads it.
#[derive(Debug, Clone)]
pub struct Frame {
    session: Session,
    info: FrameInfo,
}

impl Frame {
    pub(crate) fn new(session: Session, info: FrameInfo) -> Self {
        Frame { session, info }
    }

    pub fn id(&self) -> u64 {
        self.info.id
    }

    pub fn name(&self) -> Option<&str> {
        self.info.name.as_deref()
    }

    pub fn schema(&self) -> &FrameSchema {
        &self.info.schema
    }

    pub fn row_count(&self) -> usize {
        self.info.row_count
    }

    /// Records of the source that could not be loaded into this frame
    pub fn rejected_rows(&self) -> usize {
        self.info.rejected_rows
    }

    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Rename the frame on the server.
    ///
    /// Once this returns `Ok`, the server lists the frame under `new_name`
    /// only. On error the cached name is left unchanged.
    pub async fn set_name(&mut self, new_name: &str) -> Result<(), ClientError> {
        validate_frame_name(new_name)?;

        let body = RenameFrameRequest {
            name: new_name.to_string(),
        };
        let response = self
            .session
            .request(Method::PUT, &format!("/frames/{}/name", self.info.id))
            .json(&body)
            .send()
            .await?;
        self.info = self.session.decode(response).await?;
        Ok(())
    }

    /// Re-read this frame's summary from the server
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.info = self
            .session
            .call(Method::GET, &format!("/frames/{}", self.info.id))
            .await?;
        Ok(())
    }

    /// First `count` rows of the frame
    pub async fn take(&self, count: usize) -> Result<FrameRowsResponse, ClientError> {
        self.take_from(0, count).await
    }

    pub async fn take_from(
        &self,
        offset: usize,
        count: usize,
    ) -> Result<FrameRowsResponse, ClientError> {
        self.session
            .call(
                Method::GET,
                &format!(
                    "/frames/{}/rows?offset={}&count={}",
                    self.info.id, offset, count
                ),
            )
            .await
    }

    /// Remove the frame from the server
    pub async fn drop_frame(self) -> Result<(), ClientError> {
        let response: DropFrameResponse = self
            .session
            .call(Method::DELETE, &format!("/frames/{}", self.info.id))
            .await?;
        log::debug!("Dropped frame {} ({:?})", response.dropped, response.name);
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{FrameSchema, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStatus {
    Active,
}

/// A frame as held by the registry
#[derive(Debug, Clone)]
pub struct FrameData {
    pub id: u64,
    pub name: Option<String>,
    pub schema: FrameSchema,
    pub rows: Vec<Vec<Value>>,
    pub rejected_rows: usize,
    pub status: FrameStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl FrameData {
    pub fn new(
        id: u64,
        name: Option<String>,
        schema: FrameSchema,
        rows: Vec<Vec<Value>>,
        rejected_rows: usize,
    ) -> Self {
        let now = Utc::now();
        FrameData {
            id,
            name,
            schema,
            rows,
            rejected_rows,
            status: FrameStatus::Active,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            id: self.id,
            name: self.name.clone(),
            schema: self.schema.clone(),
            row_count: self.rows.len(),
            rejected_rows: self.rejected_rows,
            status: self.status,
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// Summary of a frame as reported over the API (no row data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub id: u64,
    pub name: Option<String>,
    pub schema: FrameSchema,
    pub row_count: usize,
    pub rejected_rows: usize,
    pub status: FrameStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A window of a frame's rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRows {
    pub columns: Vec<String>,
    pub offset: usize,
    pub rows: Vec<Vec<Value>>,
}

impl FrameRows {
    pub fn slice(frame: &FrameData, offset: usize, count: usize) -> Self {
        let rows = frame
            .rows
            .iter()
            .skip(offset)
            .take(count)
            .cloned()
            .collect();
        FrameRows {
            columns: frame
                .schema
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            offset,
            rows,
        }
    }
}

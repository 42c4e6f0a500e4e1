//! Frame catalog
//!
//! Named, schema-typed tabular datasets held in memory by the server:
//! - column types and schemas (`schema`)
//! - delimited source files frames are built from (`csv_source`)
//! - the frame record and its API summary (`frame`)
//! - the registry that creates, renames, lists and drops frames (`registry`)

pub mod csv_source;
pub mod errors;
pub mod frame;
pub mod registry;
pub mod schema;

pub use csv_source::CsvFile;
pub use errors::FrameCatalogError;
pub use frame::{FrameInfo, FrameRows, FrameStatus};
pub use registry::{validate_frame_name, FrameRegistry};
pub use schema::{Column, DataType, FrameSchema, Value};

//! Frameserver - In-memory frame service and its client library
//!
//! This crate provides:
//! - A frame catalog of named, schema-typed tabular datasets built from delimited files
//! - An HTTP API to create, rename, list, inspect and drop frames
//! - A client library with explicit per-session configuration

pub mod client;
pub mod config;
pub mod frame_catalog;
pub mod server;

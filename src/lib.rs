//! docrelay: upload files into an Elasticsearch index as base64 data URIs
//! and export stored documents back to local files.
//!
//! - **`relay`**: data-URI encoding, the document store client, and on-disk
//!   upload/export handling.
//! - **`gateway`**: the axum HTTP surface (`POST /upload`, `GET /file/{id}`).
//! - **`config`**: TOML + environment configuration.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod relay;

pub use config::Config;

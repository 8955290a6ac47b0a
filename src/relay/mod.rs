//! Relay core: encode uploads as data URIs, keep them in a document store,
//! and export stored content back to disk.

pub mod encode;
pub mod schema;
pub mod storage;
pub mod store;

pub use encode::{encode_bytes, encode_file, guess_mime_type};
pub use storage::{ExportWriter, UploadStorage};
pub use store::{DocumentStore, ElasticStore, StoreError};

//! A single `POST /upload` endpoint that takes an `image` file and a `text`
//! label as multipart/form-data, stores the image as
//! `{unix millis}-{sanitized name}` and writes a `{name}.json` sidecar holding
//! the filename, the label and the upload time.

pub mod config;
pub mod error;
pub mod handler;
pub mod parts;
pub mod record;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::UploadError;
pub use parts::{File, FileParts, Parts, PartsConfig, TextParts};
pub use record::UploadRecord;
pub use store::{StoredImage, UploadStore};

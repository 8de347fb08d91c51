//! File management — upload, categorize, rename, delete, download.

pub mod service;

pub use service::{FileService, UploadRequest};

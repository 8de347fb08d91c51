//! # filetrace-core
//!
//! Core crate for FileTrace. Contains configuration schemas, the object
//! store trait, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FileTrace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

//! # filetrace-database
//!
//! PostgreSQL connection management, the store traits the service layer
//! depends on, and their concrete repository implementations.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod stores;

pub use connection::DatabasePool;
pub use stores::{AuditStore, FileStore, ShareStore, UserStore};

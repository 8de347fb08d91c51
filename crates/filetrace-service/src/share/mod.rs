//! Share management — create, list, revoke, and redeem share grants.

pub mod access;
pub mod link;
pub mod service;

pub use access::{AccessOutcome, AccessService, SharePreview};
pub use link::LinkService;
pub use service::ShareService;

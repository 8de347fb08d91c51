//! Share domain entities.

pub mod link;
pub mod model;

pub use link::ShareLink;
pub use model::{CreateShareGrant, ShareGrant, ShareGrantSummary, ShareKind};

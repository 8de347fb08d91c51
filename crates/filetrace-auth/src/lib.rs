//! # filetrace-auth
//!
//! The authentication collaborator boundary. FileTrace never issues or
//! refreshes tokens; this crate only verifies inbound access tokens and
//! yields the `(user id, username)` identity embedded in them.

pub mod jwt;

pub use jwt::claims::Claims;
pub use jwt::decoder::JwtDecoder;

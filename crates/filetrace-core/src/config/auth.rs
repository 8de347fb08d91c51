//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token verification configuration.
///
/// FileTrace does not issue tokens itself; it only verifies access tokens
/// produced by the authentication collaborator, so the secret is the only
/// mandatory knob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT verification (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Allowed clock skew when validating `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_leeway() -> u64 {
    5
}

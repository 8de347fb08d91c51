//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Settings for link-kind share grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Public URL prefix the share token is appended to when building
    /// a shareable link (e.g. `https://files.example.com/s`).
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080/api/s".to_string()
}

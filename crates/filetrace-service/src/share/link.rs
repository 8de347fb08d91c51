//! Share link token generation and URL construction.

use rand::RngCore;

use filetrace_entity::share::{ShareGrant, ShareLink};

/// Bytes of entropy per token; 32 bytes hex-encode to 64 characters.
const TOKEN_BYTES: usize = 32;

/// Generates share link tokens and builds public share URLs.
#[derive(Debug, Clone)]
pub struct LinkService {
    /// Public URL prefix tokens are appended to.
    public_base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
        }
    }

    /// Generates a share token: 64 lowercase hex characters from 256 bits
    /// of OS-seeded CSPRNG output.
    ///
    /// Entropy source failure aborts the process; it is not a recoverable
    /// condition.
    pub fn generate_token(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Builds the public URL for a token.
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), token)
    }

    /// Builds the [`ShareLink`] value object for a freshly created link grant.
    ///
    /// Callers must only pass link-kind grants, which always carry a token.
    pub fn build_link(&self, grant: &ShareGrant) -> ShareLink {
        let token = grant.token.clone().unwrap_or_default();
        ShareLink {
            grant_id: grant.id,
            url: self.share_url(&token),
            token,
            expires_at: grant.expires_at,
            max_access_count: grant.max_access_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let links = LinkService::new("http://localhost/s");
        let token = links.generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let links = LinkService::new("http://localhost/s");
        let a = links.generate_token();
        let b = links.generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_share_url_joins_cleanly() {
        let links = LinkService::new("http://localhost/s/");
        assert_eq!(links.share_url("abc"), "http://localhost/s/abc");
    }
}

//! Access token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use filetrace_core::config::auth::AuthConfig;
use filetrace_core::error::AppError;

use super::claims::Claims;

/// Validates access tokens issued by the authentication collaborator.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            leeway_seconds: 0,
        }
    }

    fn token_with(secret: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "mallory".to_string(),
            iat: now,
            exp: now + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode")
    }

    #[test]
    fn test_decode_valid_token() {
        let decoder = JwtDecoder::new(&config());
        let claims = decoder
            .decode_access_token(&token_with("test-secret", 600))
            .expect("valid token");
        assert_eq!(claims.username, "mallory");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_reject_expired_token() {
        let decoder = JwtDecoder::new(&config());
        let err = decoder
            .decode_access_token(&token_with("test-secret", -600))
            .unwrap_err();
        assert_eq!(err.kind, filetrace_core::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn test_reject_wrong_signature() {
        let decoder = JwtDecoder::new(&config());
        assert!(
            decoder
                .decode_access_token(&token_with("other-secret", 600))
                .is_err()
        );
    }
}

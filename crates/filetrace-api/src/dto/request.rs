//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create share request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareRequest {
    /// File to share.
    pub resource_id: Uuid,
    /// Share kind: `"link"` or `"user"`.
    pub kind: String,
    /// Recipient login name (user shares).
    pub recipient_username: Option<String>,
    /// Minutes until expiry; 10 minutes to one year.
    #[validate(range(
        min = 10,
        max = 525960,
        message = "expiration_minutes must be between 10 minutes and one year"
    ))]
    pub expiration_minutes: Option<i64>,
    /// Ceiling on successful accesses.
    #[validate(range(min = 1, message = "max_access_count must be positive"))]
    pub max_access_count: Option<i32>,
}

/// Query parameters for listing a file's shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSharesQuery {
    /// Include revoked and expired grants (management view).
    #[serde(default)]
    pub include_inactive: bool,
}

/// Update file request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New file name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New category label.
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share_request(minutes: Option<i64>, max: Option<i32>) -> CreateShareRequest {
        CreateShareRequest {
            resource_id: Uuid::new_v4(),
            kind: "link".to_string(),
            recipient_username: None,
            expiration_minutes: minutes,
            max_access_count: max,
        }
    }

    #[test]
    fn test_expiration_bounds() {
        assert!(share_request(Some(10), None).validate().is_ok());
        assert!(share_request(Some(525_960), None).validate().is_ok());
        assert!(share_request(Some(9), None).validate().is_err());
        assert!(share_request(Some(0), None).validate().is_err());
        assert!(share_request(Some(-30), None).validate().is_err());
        assert!(share_request(Some(525_961), None).validate().is_err());
    }

    #[test]
    fn test_access_count_must_be_positive() {
        assert!(share_request(None, Some(1)).validate().is_ok());
        assert!(share_request(None, Some(0)).validate().is_err());
        assert!(share_request(None, Some(-3)).validate().is_err());
    }

    #[test]
    fn test_absent_limits_pass_dto_validation() {
        // The at-least-one-limit rule is the service's to enforce; the DTO
        // only bounds the values that are present.
        assert!(share_request(None, None).validate().is_ok());
    }
}

//! The closed set of auditable actions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An action kind recorded in the audit log.
///
/// The set is closed on purpose: `AuditStore::append` only accepts values
/// of this enum, so an unknown action string can never reach the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action")]
pub enum AuditAction {
    /// A file was uploaded.
    #[sqlx(rename = "file.upload")]
    #[serde(rename = "file.upload")]
    FileUpload,
    /// A file owner downloaded their own file.
    #[sqlx(rename = "file.download")]
    #[serde(rename = "file.download")]
    FileDownload,
    /// A file was renamed or recategorized.
    #[sqlx(rename = "file.rename")]
    #[serde(rename = "file.rename")]
    FileRename,
    /// A file was deleted.
    #[sqlx(rename = "file.delete")]
    #[serde(rename = "file.delete")]
    FileDelete,
    /// A share grant was created.
    #[sqlx(rename = "share.create")]
    #[serde(rename = "share.create")]
    ShareCreate,
    /// One or more share grants were revoked.
    #[sqlx(rename = "share.revoke")]
    #[serde(rename = "share.revoke")]
    ShareRevoke,
    /// A shared file was successfully accessed through a grant.
    #[sqlx(rename = "share.download")]
    #[serde(rename = "share.download")]
    ShareDownload,
    /// An access attempt against an invalid, expired, revoked, or
    /// exhausted grant was rejected.
    #[sqlx(rename = "share.denied")]
    #[serde(rename = "share.denied")]
    ShareDenied,
}

impl AuditAction {
    /// The canonical wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileUpload => "file.upload",
            Self::FileDownload => "file.download",
            Self::FileRename => "file.rename",
            Self::FileDelete => "file.delete",
            Self::ShareCreate => "share.create",
            Self::ShareRevoke => "share.revoke",
            Self::ShareDownload => "share.download",
            Self::ShareDenied => "share.denied",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for action in [
            AuditAction::FileUpload,
            AuditAction::FileDownload,
            AuditAction::FileRename,
            AuditAction::FileDelete,
            AuditAction::ShareCreate,
            AuditAction::ShareRevoke,
            AuditAction::ShareDownload,
            AuditAction::ShareDenied,
        ] {
            let json = serde_json::to_string(&action).expect("serialize");
            assert_eq!(json, format!("\"{action}\""));
            let parsed: AuditAction = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result: Result<AuditAction, _> = serde_json::from_str("\"share.mutate\"");
        assert!(result.is_err());
    }
}

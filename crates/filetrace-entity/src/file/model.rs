//! Stored file entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file tracked by FileTrace.
///
/// Only metadata lives here; the payload sits in the object store under
/// `storage_key`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file owner.
    pub owner_id: Uuid,
    /// The file name (including extension).
    pub name: String,
    /// User-assigned category label.
    pub category: Option<String>,
    /// MIME type of the file.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Key of the payload within the object store.
    pub storage_key: String,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StoredFile {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStoredFile {
    /// The file owner.
    pub owner_id: Uuid,
    /// The file name.
    pub name: String,
    /// Category label.
    pub category: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Key of the payload within the object store.
    pub storage_key: String,
}

/// Fields an owner may change on an existing file. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStoredFile {
    /// New file name.
    pub name: Option<String>,
    /// New category label.
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_named(name: &str) -> StoredFile {
        let now = Utc::now();
        StoredFile {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.to_string(),
            category: None,
            mime_type: None,
            size_bytes: 0,
            storage_key: "k".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(file_named("report.PDF").extension(), Some("pdf".into()));
        assert_eq!(file_named("archive.tar.gz").extension(), Some("gz".into()));
        assert_eq!(file_named("README").extension(), None);
    }
}

//! Staging types and data structures.

use std::collections::BTreeSet;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_shared::types::FileId;

/// Whether a selection appends to or replaces the staged files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Each accepted selection replaces the collection with its first file.
    Single,
    /// Each accepted selection is appended in selection order.
    #[default]
    Multiple,
}

/// A locally selected file, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Handle identity, stable across clones.
    pub id: FileId,
    /// Original filename.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw file contents.
    pub contents: Bytes,
    /// Last modification time reported by the picker, if any.
    pub last_modified: Option<DateTime<Utc>>,
}

impl SelectedFile {
    /// Create a new file handle with a fresh id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            mime_type: mime_type.into(),
            contents: contents.into(),
            last_modified: None,
        }
    }

    /// Set the last modification time.
    #[must_use]
    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

/// Displayable form of a pending file (a `data:` URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Preview(String);

impl Preview {
    /// Wrap an already rendered preview.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the preview text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the staged collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentItem {
    /// A file already held by the remote store.
    Remote {
        /// Opaque identifier or URL.
        reference: String,
    },
    /// A locally staged file awaiting upload.
    Pending {
        /// Rendered preview of `source_file`.
        preview: Preview,
        /// The file to upload on commit.
        source_file: SelectedFile,
    },
}

impl AttachmentItem {
    /// Create a remote item.
    #[must_use]
    pub fn remote(reference: impl Into<String>) -> Self {
        Self::Remote {
            reference: reference.into(),
        }
    }

    /// The string a renderer shows for this item.
    #[must_use]
    pub fn display(&self) -> &str {
        match self {
            Self::Remote { reference } => reference,
            Self::Pending { preview, .. } => preview.as_str(),
        }
    }

    /// Whether this item is a pending local file.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// An initial remote attachment supplied by the data loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRef {
    /// Opaque identifier or URL.
    #[serde(alias = "url")]
    pub reference: String,
}

impl RemoteRef {
    /// Create a remote reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

/// Everything the submission layer needs at commit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDelta {
    /// Files to send as binary parts, in display order.
    pub uploads: Vec<SelectedFile>,
    /// Remote references to delete.
    pub removed: BTreeSet<String>,
}

impl CommitDelta {
    /// Whether committing would change anything remotely.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty() && self.removed.is_empty()
    }

    /// The removed references as a JSON array, for a form field.
    pub fn removed_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.removed)
    }

    /// Serializable summary without file contents.
    #[must_use]
    pub fn manifest(&self) -> CommitManifest {
        CommitManifest {
            uploads: self
                .uploads
                .iter()
                .map(|f| UploadEntry {
                    name: f.name.clone(),
                    mime_type: f.mime_type.clone(),
                    size: f.size(),
                    last_modified: f.last_modified,
                })
                .collect(),
            removed: self.removed.iter().cloned().collect(),
        }
    }
}

/// Serializable view of a [`CommitDelta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitManifest {
    /// Files to upload.
    pub uploads: Vec<UploadEntry>,
    /// References to delete.
    pub removed: Vec<String>,
}

/// One file in a [`CommitManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadEntry {
    /// Original filename.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_display() {
        let remote = AttachmentItem::remote("https://cdn.example.com/a.png");
        assert_eq!(remote.display(), "https://cdn.example.com/a.png");
        assert!(!remote.is_pending());

        let pending = AttachmentItem::Pending {
            preview: Preview::new("data:image/png;base64,AA=="),
            source_file: SelectedFile::new("a.png", "image/png", vec![0u8]),
        };
        assert_eq!(pending.display(), "data:image/png;base64,AA==");
        assert!(pending.is_pending());
    }

    #[test]
    fn test_remote_ref_accepts_url_alias() {
        let parsed: RemoteRef = serde_json::from_str(r#"{"url":"https://x/1.png"}"#).unwrap();
        assert_eq!(parsed, RemoteRef::new("https://x/1.png"));
    }

    #[test]
    fn test_commit_delta_removed_json() {
        let delta = CommitDelta {
            uploads: Vec::new(),
            removed: ["https://x/b".to_string(), "https://x/a".to_string()]
                .into_iter()
                .collect(),
        };
        assert_eq!(delta.removed_json().unwrap(), r#"["https://x/a","https://x/b"]"#);
        assert!(!delta.is_empty());
    }

    #[test]
    fn test_manifest_omits_contents() {
        let delta = CommitDelta {
            uploads: vec![SelectedFile::new("doc.pdf", "application/pdf", vec![1u8; 4])],
            removed: BTreeSet::new(),
        };
        let json = serde_json::to_value(delta.manifest()).unwrap();
        assert_eq!(json["uploads"][0]["name"], "doc.pdf");
        assert_eq!(json["uploads"][0]["size"], 4);
        assert!(json["uploads"][0].get("last_modified").is_none());
        assert_eq!(json["removed"], serde_json::json!([]));
    }
}

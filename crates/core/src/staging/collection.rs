//! Ordered attachment collection with its pending-file registry and retraction set.
//!
//! The collection interleaves remote and pending items in display order. The
//! registry holds only the pending files, so positions in the two sequences
//! differ; a registry position is always derived by scanning the collection,
//! never cached.

use std::collections::BTreeSet;

use super::error::StagingError;
use super::types::{AttachmentItem, CommitDelta, Preview, RemoteRef, SelectedFile};

/// The staged attachments of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    items: Vec<AttachmentItem>,
    pending_files: Vec<SelectedFile>,
    retracted: BTreeSet<String>,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection holding the given remote references.
    #[must_use]
    pub fn from_remote(refs: impl IntoIterator<Item = RemoteRef>) -> Self {
        let mut collection = Self::new();
        collection.replace_with_remote(refs);
        collection
    }

    /// Create a collection from items in display order, e.g. a restored draft.
    ///
    /// The registry is rebuilt from the pending items.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = AttachmentItem>) -> Self {
        let items: Vec<AttachmentItem> = items.into_iter().collect();
        let pending_files = items
            .iter()
            .filter_map(|item| match item {
                AttachmentItem::Pending { source_file, .. } => Some(source_file.clone()),
                AttachmentItem::Remote { .. } => None,
            })
            .collect();
        Self {
            items,
            pending_files,
            retracted: BTreeSet::new(),
        }
    }

    /// Number of items in display order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[AttachmentItem] {
        &self.items
    }

    /// Displayable form of every item, in display order.
    #[must_use]
    pub fn previews(&self) -> Vec<&str> {
        self.items.iter().map(AttachmentItem::display).collect()
    }

    /// Raw files to upload on commit, in display order.
    #[must_use]
    pub fn upload_set(&self) -> &[SelectedFile] {
        &self.pending_files
    }

    /// Remote references to delete on commit.
    #[must_use]
    pub fn deletion_set(&self) -> &BTreeSet<String> {
        &self.retracted
    }

    /// Number of pending items, counted from the collection itself.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_pending()).count()
    }

    /// Snapshot of the upload and deletion sets.
    #[must_use]
    pub fn commit_delta(&self) -> CommitDelta {
        CommitDelta {
            uploads: self.pending_files.clone(),
            removed: self.retracted.clone(),
        }
    }

    /// Remove the item at `index`, retracting it if it was remote.
    pub fn remove_at(&mut self, index: usize) -> Result<AttachmentItem, StagingError> {
        if index >= self.items.len() {
            return Err(StagingError::index_out_of_range(index, self.items.len()));
        }

        if let AttachmentItem::Remote { reference } = &self.items[index] {
            self.retracted.insert(reference.clone());
        } else {
            let registry_index = self.items[..index]
                .iter()
                .filter(|item| item.is_pending())
                .count();
            self.pending_files.remove(registry_index);
        }

        let removed = self.items.remove(index);
        self.debug_check();
        Ok(removed)
    }

    /// Remove everything, retracting every remote item.
    ///
    /// Returns the number of items removed.
    pub fn remove_all(&mut self) -> usize {
        let removed = self.items.len();
        for item in self.items.drain(..) {
            if let AttachmentItem::Remote { reference } = item {
                self.retracted.insert(reference);
            }
        }
        self.pending_files.clear();
        removed
    }

    /// Replace the items with remote references.
    ///
    /// Earlier retractions are kept.
    pub fn replace_with_remote(&mut self, refs: impl IntoIterator<Item = RemoteRef>) {
        self.items = refs
            .into_iter()
            .map(|r| AttachmentItem::Remote {
                reference: r.reference,
            })
            .collect();
        self.pending_files.clear();
    }

    /// Append decoded files in the given order.
    pub fn append_pending(&mut self, batch: impl IntoIterator<Item = (Preview, SelectedFile)>) {
        for (preview, source_file) in batch {
            self.pending_files.push(source_file.clone());
            self.items.push(AttachmentItem::Pending {
                preview,
                source_file,
            });
        }
        self.debug_check();
    }

    /// Replace the items with a single pending file.
    pub fn replace_with_pending(&mut self, preview: Preview, source_file: SelectedFile) {
        self.pending_files = vec![source_file.clone()];
        self.items = vec![AttachmentItem::Pending {
            preview,
            source_file,
        }];
    }

    /// Whether the registry mirrors the pending items exactly.
    #[must_use]
    pub fn registry_in_sync(&self) -> bool {
        let pending = self.items.iter().filter_map(|item| match item {
            AttachmentItem::Pending { source_file, .. } => Some(source_file),
            AttachmentItem::Remote { .. } => None,
        });
        self.pending_count() == self.pending_files.len() && pending.eq(self.pending_files.iter())
    }

    fn debug_check(&self) {
        debug_assert!(self.registry_in_sync(), "pending registry out of sync");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(name: &str) -> (Preview, SelectedFile) {
        (
            Preview::new(format!("data:image/png;base64,{name}")),
            SelectedFile::new(name, "image/png", name.as_bytes().to_vec()),
        )
    }

    fn names(files: &[SelectedFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Collection `[R:a, P:x, R:b, P:y, P:z]`.
    fn mixed() -> Collection {
        let item = |(preview, source_file): (Preview, SelectedFile)| AttachmentItem::Pending {
            preview,
            source_file,
        };
        Collection::from_items([
            AttachmentItem::remote("a"),
            item(pending("x")),
            AttachmentItem::remote("b"),
            item(pending("y")),
            item(pending("z")),
        ])
    }

    #[test]
    fn test_previews_in_display_order() {
        let c = mixed();
        assert_eq!(
            c.previews(),
            [
                "a",
                "data:image/png;base64,x",
                "b",
                "data:image/png;base64,y",
                "data:image/png;base64,z"
            ]
        );
        assert_eq!(names(c.upload_set()), ["x", "y", "z"]);
        assert!(c.registry_in_sync());
    }

    #[test]
    fn test_remove_remote_retracts() {
        let mut c = mixed();
        let removed = c.remove_at(2).unwrap();

        assert_eq!(removed, AttachmentItem::remote("b"));
        assert_eq!(c.len(), 4);
        assert!(c.deletion_set().contains("b"));
        assert_eq!(names(c.upload_set()), ["x", "y", "z"]);
    }

    #[test]
    fn test_remove_pending_uses_scanned_registry_index() {
        let mut c = mixed();
        // Position 3 is the second pending item.
        c.remove_at(3).unwrap();

        assert_eq!(names(c.upload_set()), ["x", "z"]);
        assert!(c.deletion_set().is_empty());
        assert!(c.registry_in_sync());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut c = mixed();
        let before = c.clone();
        assert_eq!(
            c.remove_at(5),
            Err(StagingError::index_out_of_range(5, 5))
        );
        assert_eq!(c, before);
    }

    #[test]
    fn test_remove_all_unions_retractions() {
        let mut c = mixed();
        c.remove_at(0).unwrap();
        assert_eq!(c.remove_all(), 4);

        assert!(c.is_empty());
        assert!(c.upload_set().is_empty());
        let removed: Vec<_> = c.deletion_set().iter().map(String::as_str).collect();
        assert_eq!(removed, ["a", "b"]);
    }

    #[test]
    fn test_replace_with_pending() {
        let mut c = mixed();
        let (preview, file) = pending("n");
        c.replace_with_pending(preview, file);

        assert_eq!(c.len(), 1);
        assert_eq!(names(c.upload_set()), ["n"]);
        assert!(c.deletion_set().is_empty());
        assert!(c.registry_in_sync());
    }

    #[test]
    fn test_replace_with_remote_clears_registry() {
        let mut c = mixed();
        c.remove_at(0).unwrap();
        c.replace_with_remote([RemoteRef::new("c")]);

        assert_eq!(c.previews(), ["c"]);
        assert!(c.upload_set().is_empty());
        assert!(c.deletion_set().contains("a"));
        assert!(c.registry_in_sync());
    }

    #[test]
    fn test_commit_delta() {
        let mut c = mixed();
        c.remove_at(0).unwrap();
        let delta = c.commit_delta();
        assert_eq!(names(&delta.uploads), ["x", "y", "z"]);
        assert_eq!(delta.removed.len(), 1);
    }
}

//! Property-based tests for collection index invariants.
//!
//! - The pending registry always mirrors the pending items, in order,
//!   including across whole-collection replacement
//! - Removing a remote item never touches the registry
//! - Removing a pending item never touches the retraction set
//! - Remove-all retracts every remote item on top of earlier retractions

use proptest::prelude::*;

use super::collection::Collection;
use super::types::{AttachmentItem, Preview, RemoteRef, SelectedFile};

/// Strategy for one item: remote references and pending files mixed.
fn item_strategy() -> impl Strategy<Value = AttachmentItem> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(|r| AttachmentItem::remote(format!("https://cdn.example.com/{r}"))),
        "[a-z]{1,8}".prop_map(|name| AttachmentItem::Pending {
            preview: Preview::new(format!("data:image/png;base64,{name}")),
            source_file: SelectedFile::new(name.clone(), "image/png", name.into_bytes()),
        }),
    ]
}

/// A mutation applied to a collection.
#[derive(Debug, Clone)]
enum Op {
    /// Remove at `seed % len`.
    RemoveAt(usize),
    /// Append this many pending files.
    Append(usize),
    RemoveAll,
    /// Swap the whole collection for one pending file.
    ReplaceWithPending,
    /// Swap the whole collection for this many remote references.
    ReplaceWithRemote(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<usize>().prop_map(Op::RemoveAt),
        3 => (1usize..4).prop_map(Op::Append),
        1 => Just(Op::RemoveAll),
        1 => Just(Op::ReplaceWithPending),
        1 => (0usize..4).prop_map(Op::ReplaceWithRemote),
    ]
}

fn pending_batch(n: usize, step: usize) -> Vec<(Preview, SelectedFile)> {
    (0..n)
        .map(|i| {
            let name = format!("step{step}-{i}.png");
            (
                Preview::new(format!("data:image/png;base64,{name}")),
                SelectedFile::new(name.clone(), "image/png", name.into_bytes()),
            )
        })
        .collect()
}

fn remote_refs(c: &Collection) -> Vec<String> {
    c.items()
        .iter()
        .filter_map(|item| match item {
            AttachmentItem::Remote { reference } => Some(reference.clone()),
            AttachmentItem::Pending { .. } => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The registry stays in sync after every mutation.
    #[test]
    fn prop_registry_tracks_pending_items(
        items in prop::collection::vec(item_strategy(), 0..12),
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut c = Collection::from_items(items);
        prop_assert!(c.registry_in_sync());

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::RemoveAt(seed) => {
                    if !c.is_empty() {
                        let index = seed % c.len();
                        c.remove_at(index).unwrap();
                    }
                }
                Op::Append(n) => c.append_pending(pending_batch(n, step)),
                Op::RemoveAll => {
                    c.remove_all();
                }
                Op::ReplaceWithPending => {
                    let (preview, file) = pending_batch(1, step).remove(0);
                    c.replace_with_pending(preview, file);
                }
                Op::ReplaceWithRemote(n) => {
                    let refs = (0..n)
                        .map(|i| RemoteRef::new(format!("https://cdn.example.com/s{step}-{i}")));
                    c.replace_with_remote(refs);
                }
            }
            prop_assert_eq!(c.upload_set().len(), c.pending_count());
            prop_assert!(c.registry_in_sync());
        }
    }

    /// Removal touches exactly one side-table and keeps the order of the rest.
    #[test]
    fn prop_remove_at_touches_one_side(
        items in prop::collection::vec(item_strategy(), 1..12),
        seed in any::<usize>(),
    ) {
        let mut c = Collection::from_items(items);
        let index = seed % c.len();
        let before = c.clone();
        let mut expected_previews: Vec<String> =
            before.previews().into_iter().map(str::to_string).collect();
        expected_previews.remove(index);

        let removed = c.remove_at(index).unwrap();

        prop_assert_eq!(
            c.previews().into_iter().map(str::to_string).collect::<Vec<_>>(),
            expected_previews
        );
        match removed {
            AttachmentItem::Remote { reference } => {
                prop_assert_eq!(c.upload_set(), before.upload_set());
                prop_assert_eq!(c.deletion_set().len(), before.deletion_set().len() + 1);
                prop_assert!(c.deletion_set().contains(&reference));
            }
            AttachmentItem::Pending { source_file, .. } => {
                prop_assert_eq!(c.deletion_set(), before.deletion_set());
                prop_assert_eq!(c.upload_set().len(), before.upload_set().len() - 1);
                prop_assert!(!c.upload_set().contains(&source_file));
            }
        }
    }

    /// Remove-all empties the view and retracts the union of old and current remotes.
    #[test]
    fn prop_remove_all_unions_retractions(
        items in prop::collection::vec(item_strategy(), 0..12),
        early_removals in prop::collection::vec(any::<usize>(), 0..4),
    ) {
        let mut c = Collection::from_items(items);
        for seed in early_removals {
            if !c.is_empty() {
                let index = seed % c.len();
                c.remove_at(index).unwrap();
            }
        }

        let mut expected = c.deletion_set().clone();
        expected.extend(remote_refs(&c));

        c.remove_all();

        prop_assert!(c.previews().is_empty());
        prop_assert!(c.upload_set().is_empty());
        prop_assert_eq!(c.deletion_set(), &expected);
    }
}

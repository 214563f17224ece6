//! Staging session: one editing context for a single entity's attachments.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use stagehand_shared::types::SessionId;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::collection::Collection;
use super::config::StagingConfig;
use super::decode::PreviewDecoder;
use super::error::{DecodeError, Diagnostic, StagingError, ValidationError};
use super::types::{AttachmentItem, CommitDelta, Mode, RemoteRef, SelectedFile};
use super::validator;

/// Whether initial remote items have been loaded into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationState {
    /// No initial items applied yet.
    Uninitialized,
    /// Initial items applied; later hydration calls are ignored.
    Hydrated,
}

/// Result of a [`StagingSession::hydrate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// The collection was replaced.
    Applied,
    /// Nothing changed.
    Ignored,
}

/// What happened to a batch once its decodes finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The batch was applied to the collection.
    Committed,
    /// Nothing to apply: every file was rejected or failed to decode.
    NoOp,
    /// The session was discarded; the batch was dropped.
    Suppressed,
}

/// Summary of one [`StagingSession::ingest`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Files that passed validation.
    pub accepted: usize,
    /// Items added to the collection.
    pub committed: usize,
    /// One entry per rejected or unreadable file.
    pub diagnostics: Vec<Diagnostic>,
    /// Commit result.
    pub outcome: CommitOutcome,
}

impl IngestReport {
    fn empty(diagnostics: Vec<Diagnostic>, outcome: CommitOutcome) -> Self {
        Self {
            accepted: 0,
            committed: 0,
            diagnostics,
            outcome,
        }
    }

    /// Validation rejections in selection order.
    pub fn rejected(&self) -> impl Iterator<Item = &ValidationError> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::Rejected(err) => Some(err),
            Diagnostic::DecodeFailed(_) => None,
        })
    }

    /// Decode failures in selection order.
    pub fn decode_failures(&self) -> impl Iterator<Item = &DecodeError> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::DecodeFailed(err) => Some(err),
            Diagnostic::Rejected(_) => None,
        })
    }
}

struct SessionState {
    collection: Collection,
    hydration: HydrationState,
}

struct Inner<D> {
    id: SessionId,
    config: StagingConfig,
    decoder: D,
    state: Mutex<SessionState>,
    alive: AtomicBool,
}

/// Handle to a staging session.
///
/// Clones share the same session. Every mutation holds the session lock for
/// its whole duration; an ingest only takes it to commit, after all decodes
/// have finished.
pub struct StagingSession<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for StagingSession<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: PreviewDecoder> StagingSession<D> {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: StagingConfig, decoder: D) -> Self {
        let id = SessionId::new();
        debug!(session_id = %id, mode = ?config.mode, "staging session created");
        Self {
            inner: Arc::new(Inner {
                id,
                config,
                decoder,
                state: Mutex::new(SessionState {
                    collection: Collection::new(),
                    hydration: HydrationState::Uninitialized,
                }),
                alive: AtomicBool::new(true),
            }),
        }
    }

    /// Create a session preloaded with existing remote attachments.
    ///
    /// The session counts as hydrated even when `initial` is empty, so any
    /// later [`hydrate`](Self::hydrate) is ignored.
    #[must_use]
    pub fn with_initial(
        config: StagingConfig,
        decoder: D,
        initial: impl IntoIterator<Item = RemoteRef>,
    ) -> Self {
        let session = Self::new(config, decoder);
        session.hydrate(initial);
        session
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Selection mode, fixed for the session.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.inner.config.mode
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &StagingConfig {
        &self.inner.config
    }

    /// Current hydration state.
    #[must_use]
    pub fn hydration_state(&self) -> HydrationState {
        self.lock().hydration
    }

    /// Load existing remote attachments, once.
    ///
    /// Only the first call counts, whatever its length: it replaces the
    /// collection with `initial` and every later call is ignored, so
    /// in-progress edits survive a refreshed load. An empty first call leaves
    /// the collection untouched.
    pub fn hydrate(&self, initial: impl IntoIterator<Item = RemoteRef>) -> HydrateOutcome {
        let mut state = self.lock();
        if state.hydration == HydrationState::Hydrated {
            debug!(session_id = %self.inner.id, "hydration ignored, already hydrated");
            return HydrateOutcome::Ignored;
        }
        state.hydration = HydrationState::Hydrated;

        let refs: Vec<RemoteRef> = initial.into_iter().collect();
        if refs.is_empty() {
            debug!(session_id = %self.inner.id, "hydrated with no items");
            return HydrateOutcome::Ignored;
        }

        debug!(session_id = %self.inner.id, count = refs.len(), "hydrating");
        state.collection.replace_with_remote(refs);
        HydrateOutcome::Applied
    }

    /// Validate, decode and stage a selection of files.
    ///
    /// Rejected and unreadable files are reported and skipped. The rest are
    /// committed together, in selection order, once every decode has
    /// finished. In [`Mode::Single`] only the first decoded file is kept and
    /// it replaces the collection.
    pub async fn ingest(&self, files: Vec<SelectedFile>) -> IngestReport {
        let session_id = self.inner.id;
        if !self.is_alive() {
            return IngestReport::empty(Vec::new(), CommitOutcome::Suppressed);
        }

        let (accepted, rejected) = validator::partition(&self.inner.config, files);
        let mut diagnostics: Vec<Diagnostic> = rejected
            .into_iter()
            .inspect(|err| {
                warn!(%session_id, file = err.file_name(), error = %err, "file rejected");
            })
            .map(Diagnostic::Rejected)
            .collect();

        if accepted.is_empty() {
            return IngestReport::empty(diagnostics, CommitOutcome::NoOp);
        }

        let accepted_count = accepted.len();
        let decoder = &self.inner.decoder;
        // join_all yields results in input order whatever order they finish in.
        let results = join_all(accepted.iter().map(|file| decoder.decode(file))).await;

        let mut decoded = Vec::with_capacity(accepted_count);
        for (file, result) in accepted.into_iter().zip(results) {
            match result {
                Ok(preview) => decoded.push((preview, file)),
                Err(err) => {
                    warn!(%session_id, file = %file.name, error = %err, "decode failed");
                    diagnostics.push(Diagnostic::DecodeFailed(err));
                }
            }
        }

        let mut state = self.lock();
        if !self.is_alive() {
            debug!(%session_id, "session discarded, dropping batch");
            return IngestReport {
                accepted: accepted_count,
                committed: 0,
                diagnostics,
                outcome: CommitOutcome::Suppressed,
            };
        }

        let committed = match self.inner.config.mode {
            Mode::Single => match decoded.into_iter().next() {
                Some((preview, file)) => {
                    state.collection.replace_with_pending(preview, file);
                    1
                }
                None => 0,
            },
            Mode::Multiple => {
                let count = decoded.len();
                state.collection.append_pending(decoded);
                count
            }
        };
        drop(state);

        let outcome = if committed == 0 {
            CommitOutcome::NoOp
        } else {
            info!(%session_id, committed, skipped = diagnostics.len(), "batch committed");
            CommitOutcome::Committed
        };

        IngestReport {
            accepted: accepted_count,
            committed,
            diagnostics,
            outcome,
        }
    }

    /// Run [`ingest`](Self::ingest) on the tokio runtime.
    pub fn spawn_ingest(&self, files: Vec<SelectedFile>) -> JoinHandle<IngestReport>
    where
        D: 'static,
    {
        let session = self.clone();
        tokio::spawn(async move { session.ingest(files).await })
    }

    /// Remove the item at `index`; a remote item is marked for deletion.
    pub fn remove_at(&self, index: usize) -> Result<AttachmentItem, StagingError> {
        let removed = self.lock().collection.remove_at(index)?;
        debug!(
            session_id = %self.inner.id,
            index,
            pending = removed.is_pending(),
            "item removed"
        );
        Ok(removed)
    }

    /// Remove every item; remote items are marked for deletion.
    pub fn remove_all(&self) -> usize {
        let removed = self.lock().collection.remove_all();
        debug!(session_id = %self.inner.id, removed, "all items removed");
        removed
    }

    /// Displayable form of every item, in display order.
    #[must_use]
    pub fn previews(&self) -> Vec<String> {
        self.lock()
            .collection
            .previews()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Raw files to upload on commit.
    #[must_use]
    pub fn upload_set(&self) -> Vec<SelectedFile> {
        self.lock().collection.upload_set().to_vec()
    }

    /// Remote references to delete on commit.
    #[must_use]
    pub fn deletion_set(&self) -> BTreeSet<String> {
        self.lock().collection.deletion_set().clone()
    }

    /// First preview, for single-attachment forms.
    #[must_use]
    pub fn first_preview(&self) -> Option<String> {
        self.lock()
            .collection
            .previews()
            .first()
            .map(|p| (*p).to_string())
    }

    /// First file to upload, for single-attachment forms.
    #[must_use]
    pub fn first_upload(&self) -> Option<SelectedFile> {
        self.lock().collection.upload_set().first().cloned()
    }

    /// Upload and deletion sets, taken under one lock.
    #[must_use]
    pub fn commit_delta(&self) -> CommitDelta {
        self.lock().collection.commit_delta()
    }

    /// Copy of the whole collection.
    #[must_use]
    pub fn snapshot(&self) -> Collection {
        self.lock().collection.clone()
    }

    /// Abandon the session; any in-flight ingest will not commit.
    pub fn discard(&self) {
        let _state = self.lock();
        self.inner.alive.store(false, Ordering::SeqCst);
        debug!(session_id = %self.inner.id, "staging session discarded");
    }

    /// Whether the session has not been discarded.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

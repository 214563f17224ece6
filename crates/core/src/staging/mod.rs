//! Attachment staging for one editing session.
//!
//! This module lets a user accumulate, preview, validate and retract
//! attachments before a commit:
//! - Remote references already held by the store
//! - Pending local files with decoded previews
//! - Retractions of removed remote references
//!
//! At commit time the session yields exactly what the transport needs: the
//! files to upload and the references to delete. Nothing here performs
//! network I/O.

mod collection;
mod config;
mod decode;
mod error;
mod session;
mod types;
mod validator;

#[cfg(test)]
mod collection_props;

pub use collection::Collection;
pub use config::StagingConfig;
pub use decode::{DataUrlDecoder, PreviewDecoder};
pub use error::{DecodeError, Diagnostic, StagingError, ValidationError};
pub use session::{
    CommitOutcome, HydrateOutcome, HydrationState, IngestReport, StagingSession,
};
pub use types::{
    AttachmentItem, CommitDelta, CommitManifest, Mode, Preview, RemoteRef, SelectedFile,
    UploadEntry,
};
pub use validator::{partition, validate};

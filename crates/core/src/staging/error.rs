//! Staging error types.

use thiserror::Error;

use super::config::StagingConfig;

/// Why a candidate file was refused before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// MIME type not in the allow-list.
    #[error("file '{name}' has unsupported type '{mime_type}'")]
    UnsupportedType {
        /// Original filename.
        name: String,
        /// The refused MIME type.
        mime_type: String,
    },

    /// File exceeds the size ceiling.
    #[error("file '{name}' is {size} bytes, exceeding maximum {max} bytes")]
    TooLarge {
        /// Original filename.
        name: String,
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },
}

impl ValidationError {
    /// Create an unsupported type error.
    #[must_use]
    pub fn unsupported_type(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Create a file too large error.
    #[must_use]
    pub fn too_large(name: impl Into<String>, size: u64, max: u64) -> Self {
        Self::TooLarge {
            name: name.into(),
            size,
            max,
        }
    }

    /// Name of the rejected file.
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::UnsupportedType { name, .. } | Self::TooLarge { name, .. } => name,
        }
    }
}

/// A file could not be turned into a preview.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not read '{name}': {reason}")]
pub struct DecodeError {
    /// Original filename.
    pub name: String,
    /// Underlying cause.
    pub reason: String,
}

impl DecodeError {
    /// Create a decode error.
    #[must_use]
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Staging session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    /// `remove_at` called with an index outside the collection.
    #[error("index {index} out of range for collection of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length at the time of the call.
        len: usize,
    },

    /// Candidate file refused.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Preview decode failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl StagingError {
    /// Create an index out of range error.
    #[must_use]
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

/// A non-fatal, per-file problem reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Refused by the validator.
    Rejected(ValidationError),
    /// Accepted but unreadable.
    DecodeFailed(DecodeError),
}

impl Diagnostic {
    /// Name of the file the diagnostic is about.
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::Rejected(err) => err.file_name(),
            Self::DecodeFailed(err) => &err.name,
        }
    }

    /// Short user-facing message, suitable for a toast.
    ///
    /// Type rejections list the configured allow-list; size rejections
    /// state the ceiling that was applied.
    #[must_use]
    pub fn message(&self, config: &StagingConfig) -> String {
        match self {
            Self::Rejected(ValidationError::UnsupportedType { .. }) => format!(
                "Please choose {} files only.",
                type_list(&config.allowed_mime_types)
            ),
            Self::Rejected(ValidationError::TooLarge { name, max, .. }) => {
                format!("File {name} exceeds {}. Skipping.", human_size(*max))
            }
            Self::DecodeFailed(err) => format!("File {} could not be read. Skipping.", err.name),
        }
    }
}

/// Short label for a MIME type, e.g. `image/jpeg` -> `JPG`.
fn type_label(mime_type: &str) -> String {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/jpeg" => "JPG".to_string(),
        other => other
            .rsplit('/')
            .next()
            .unwrap_or(other)
            .to_ascii_uppercase(),
    }
}

/// `A`, `A or B`, `A, B, or C`.
fn type_list(mime_types: &[String]) -> String {
    let labels: Vec<String> = mime_types.iter().map(|t| type_label(t)).collect();
    match labels.as_slice() {
        [] => "supported".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [rest @ .., last] => format!("{}, or {last}", rest.join(", ")),
    }
}

fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

//! Preview decoding.

use std::future::Future;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::DecodeError;
use super::types::{Preview, SelectedFile};

/// Turns a selected file into something a renderer can display.
///
/// Implementations must be safe to call concurrently; one ingest runs a decode
/// per accepted file and awaits them together.
pub trait PreviewDecoder: Send + Sync {
    /// Decode a file into its preview.
    fn decode(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<Preview, DecodeError>> + Send;
}

/// Renders files as base64 `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlDecoder;

impl DataUrlDecoder {
    /// Create a new data URL decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encode contents as a `data:` URL.
    #[must_use]
    pub fn encode(mime_type: &str, contents: &[u8]) -> String {
        format!("data:{mime_type};base64,{}", STANDARD.encode(contents))
    }
}

impl PreviewDecoder for DataUrlDecoder {
    async fn decode(&self, file: &SelectedFile) -> Result<Preview, DecodeError> {
        let mime_type = file.mime_type.clone();
        let contents = file.contents.clone();

        // Encoding a couple of MiB is CPU work; keep it off the async workers.
        tokio::task::spawn_blocking(move || Self::encode(&mime_type, &contents))
            .await
            .map(Preview::new)
            .map_err(|err| DecodeError::new(&file.name, err.to_string()))
    }
}

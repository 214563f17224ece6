//! Reading local files into selection handles.

use std::path::Path;

use chrono::{DateTime, Utc};
use stagehand_core::staging::SelectedFile;
use stagehand_shared::{AppError, AppResult};
use tokio::io::AsyncReadExt;

/// Read a file from disk, detecting its media type from its contents.
///
/// At most `max_file_size + 1` bytes are loaded. An oversized file keeps
/// enough bytes to be sniffed and then refused by the validator, without
/// pulling the whole file into memory.
pub async fn read_selected(path: &Path, max_file_size: u64) -> AppResult<SelectedFile> {
    let io_err = |e: std::io::Error| AppError::Io(format!("{}: {e}", path.display()));

    let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

    let limit = max_file_size.saturating_add(1);
    let capacity = usize::try_from(metadata.len().min(limit)).unwrap_or(0);
    let mut contents = Vec::with_capacity(capacity);
    tokio::fs::File::open(path)
        .await
        .map_err(io_err)?
        .take(limit)
        .read_to_end(&mut contents)
        .await
        .map_err(io_err)?;

    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mime_type = sniff_mime(path, &contents);

    let file = SelectedFile::new(name, mime_type, contents);
    Ok(match modified {
        Some(at) => file.with_last_modified(at),
        None => file,
    })
}

/// Media type from magic bytes, falling back to the extension.
pub fn sniff_mime(path: &Path, contents: &[u8]) -> String {
    if let Some(kind) = infer::get(contents) {
        return kind.mime_type().to_string();
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
    .to_string()
}

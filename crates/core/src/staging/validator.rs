//! Candidate file validation.

use super::config::StagingConfig;
use super::error::ValidationError;
use super::types::SelectedFile;

/// Check one file against the allow-list and size ceiling.
///
/// The type check runs first, so a file failing both reports `UnsupportedType`.
pub fn validate(config: &StagingConfig, file: &SelectedFile) -> Result<(), ValidationError> {
    if !config.is_mime_type_allowed(&file.mime_type) {
        return Err(ValidationError::unsupported_type(&file.name, &file.mime_type));
    }

    let size = file.size();
    if size > config.max_file_size {
        return Err(ValidationError::too_large(&file.name, size, config.max_file_size));
    }

    Ok(())
}

/// Split a selection into accepted files (selection order kept) and rejections.
pub fn partition(
    config: &StagingConfig,
    files: impl IntoIterator<Item = SelectedFile>,
) -> (Vec<SelectedFile>, Vec<ValidationError>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        match validate(config, &file) {
            Ok(()) => accepted.push(file),
            Err(err) => rejected.push(err),
        }
    }

    (accepted, rejected)
}

//! Staging configuration types.

use stagehand_shared::{ModeSetting, StagingSettings};

use super::types::Mode;

/// Staging session configuration.
#[derive(Debug, Clone)]
pub struct StagingConfig {
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for staging.
    pub allowed_mime_types: Vec<String>,
    /// Whether a selection appends or replaces.
    pub mode: Mode,
}

impl StagingConfig {
    /// Default max file size: 2MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

    /// Create a new staging config with default settings.
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
            mode,
        }
    }

    /// Build from loaded application settings.
    #[must_use]
    pub fn from_settings(settings: &StagingSettings) -> Self {
        let mode = match settings.mode {
            ModeSetting::Single => Mode::Single,
            ModeSetting::Multiple => Mode::Multiple,
        };
        Self {
            max_file_size: settings.max_file_size,
            allowed_mime_types: settings.allowed_mime_types.clone(),
            mode,
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, types: Vec<String>) -> Self {
        self.allowed_mime_types = types;
        self
    }

    /// Default allowed MIME types: PNG, JPEG and PDF.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        vec![
            "image/png".to_string(),
            "image/jpeg".to_string(),
            "application/pdf".to_string(),
        ]
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self::new(Mode::Multiple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_config_defaults() {
        let config = StagingConfig::default();
        assert_eq!(config.max_file_size, 2 * 1024 * 1024);
        assert_eq!(config.mode, Mode::Multiple);
        assert_eq!(config.allowed_mime_types.len(), 3);
    }

    #[test]
    fn test_mime_type_validation() {
        let config = StagingConfig::default();
        assert!(config.is_mime_type_allowed("application/pdf"));
        assert!(config.is_mime_type_allowed("image/png"));
        assert!(config.is_mime_type_allowed("IMAGE/JPEG"));
        assert!(!config.is_mime_type_allowed("image/gif"));
        assert!(!config.is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_from_settings() {
        let settings = StagingSettings {
            max_file_size: 10,
            allowed_mime_types: vec!["image/png".to_string()],
            mode: ModeSetting::Single,
        };
        let config = StagingConfig::from_settings(&settings);
        assert_eq!(config.max_file_size, 10);
        assert_eq!(config.mode, Mode::Single);
        assert!(!config.is_mime_type_allowed("application/pdf"));
    }
}

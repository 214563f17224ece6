//! Shared types, errors, and configuration for Stagehand.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for staging sessions
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LogSettings, ModeSetting, StagingSettings};
pub use error::{AppError, AppResult};

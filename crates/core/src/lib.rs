//! Core staging logic for Stagehand.
//!
//! This crate contains the attachment staging model with ZERO transport
//! dependencies. Submission and rendering layers consume its outputs.
//!
//! # Modules
//!
//! - `staging` - Attachment collection, validation, ingestion and retraction

pub mod staging;

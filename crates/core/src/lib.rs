//! Core ingestion logic for Mediahub.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the [`attachment::AttachmentCatalog`] trait,
//! which the db crate implements.
//!
//! # Modules
//!
//! - `attachment` - Upload pipeline, dedup, crop, listing and deletion
//! - `storage` - Content-addressed backends over OpenDAL
//! - `transform` - Image probe, clamp and re-encode

pub mod attachment;
pub mod storage;
pub mod transform;

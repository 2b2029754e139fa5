//! Shared wire-level building blocks for the Enterprise Auth admin client.
//!
//! This crate provides the pieces every API record is built from:
//! - ISO-8601 timestamp codec
//! - Three-state `Patch` wrapper for partial-update request fields
//! - Page-based list envelopes
//! - Client-side validation rules mirroring the backend
//! - Webhook signature helpers

pub mod crypto;
pub mod iso8601;
pub mod pagination;
pub mod patch;
pub mod validation;

pub use pagination::{ItemsKey, Page, PageQuery};
pub use patch::Patch;

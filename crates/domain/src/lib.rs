//! Typed API contract for the enterprise auth admin backend.
//!
//! This crate contains:
//! - Request and response records for every admin API family
//! - Closed enumerations with wire values and labels
//! - The JSON wire codec used to decode and encode them

#[macro_use]
pub mod labels;

pub mod codec;
pub mod models;

pub use codec::{JsonMap, JsonValue, WireError, WireRecord};
pub use labels::{UnknownVariant, WireEnum};

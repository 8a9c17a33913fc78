//! Core modules for ant's annotation store.
//!
//! Everything below the CLI lives here: the on-disk record format, the
//! location addressing scheme, store metadata, and the store itself.

pub mod error;
pub mod location;
pub mod metadata;
pub mod record;
pub mod store;

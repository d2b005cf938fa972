//! clustertop - interactive terminal dashboard for cluster resources.
//!
//! This library provides:
//! - [`source`] - the fetch contract plus demo and `kubectl` data sources
//! - [`tui`] - views, dispatcher and terminal handling
//! - [`fmt`] - shared formatting helpers

pub mod fmt;
pub mod source;
pub mod tui;

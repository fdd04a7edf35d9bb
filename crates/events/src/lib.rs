//! Event system for geopush
//!
//! This crate provides the event bus and event types that let hosts observe
//! push registration and workflow runs as they happen.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;

//! # Jukebot Common Library
//!
//! Shared code for the jukebot crates including:
//! - Event types (JukebotEvent enum) and the EventBus
//! - Configuration file resolution and TOML loading
//! - Error types
//! - Time conversion helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventBus, JukebotEvent, PlaybackState, RequesterId};

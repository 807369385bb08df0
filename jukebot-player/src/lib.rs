//! # Jukebot Player Library (jukebot-player)
//!
//! Shared playback stream fed by many concurrent requesters.
//!
//! **Purpose:** Keep an ordered queue of requested songs, play them one at a
//! time through a playback backend, and advance automatically when each song's
//! duration has elapsed.
//!
//! **Architecture:**
//! - [`playback`]: ordered queue, advance timer, backend adapter and the
//!   coordinator state machine tying them together under one lock
//! - [`session`]: chat-facing glue (requester registry, search, commands)
//! - [`config`]: TOML bootstrap configuration

pub mod config;
pub mod error;
pub mod playback;
pub mod session;

pub use error::{BackendError, Error, Result};
pub use playback::{Coordinator, SongEntry};

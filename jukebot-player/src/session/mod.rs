//! Chat-facing glue around the coordinator

pub mod commands;
pub mod requester;
pub mod search;

pub use commands::{ChatMessage, ChatSession, Command};
pub use requester::{Requester, RequesterRegistry};
pub use search::{CatalogTrack, SearchProvider, StaticCatalog};

//! # Lootrun Session
//!
//! Records lootruns from host callbacks and manages saved ones.
//!
//! ## Layout
//!
//! - [`session`]: the Disabled / Recording / Loaded state machine
//! - [`store`]: named recording files (`RecordingStore`, JSON on disk)
//! - [`cache`]: compiled instances of every saved lootrun
//! - [`service`]: the owned entry point tying them together
//! - [`config`]: TOML configuration
//!
//! ## Threading
//!
//! Everything runs on the caller's thread. Nothing here locks or spawns.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod config;
pub mod error;
pub mod service;
pub mod session;
pub mod store;

pub use cache::{LootrunCache, RefreshReport};
pub use config::LootrunConfig;
pub use error::{
    ConfigError, ConfigResult, SessionError, SessionResult, StoreError, StoreResult,
};
pub use service::LootrunService;
pub use session::{RecordingSession, RecordingState, UndoResult};
pub use store::{JsonDirectoryStore, RecordingStore, SaveResult, WriteMode};

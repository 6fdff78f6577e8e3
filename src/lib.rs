//! Matching and relationship-lifecycle engine for a two-sided dating
//! product: candidate discovery, weighted compatibility scoring, swipe
//! recording with idempotent mutual-match creation, the match state
//! machine, single-slot undo, and deterministic daily recommendations.
//!
//! The engine is a synchronous embedded library. Persistence sits behind
//! the trait contracts in [`storage`]; [`storage::memory`] ships
//! ready-made in-memory implementations. Every service takes its
//! collaborators explicitly, including the [`clock::Clock`] it reads time
//! from, so date rollover and seeded selection are fully testable.
//!
//! ```
//! use std::sync::Arc;
//!
//! use emberlink::clock::SystemClock;
//! use emberlink::matching::{MatchingService, UndoService};
//! use emberlink::storage::memory::{
//!     MemoryLikeStore, MemoryMatchStore, MemoryTrustSafetyStore, MemoryUndoStore,
//!     MemoryUserStore,
//! };
//!
//! let users = Arc::new(MemoryUserStore::new());
//! let likes = Arc::new(MemoryLikeStore::new());
//! let matches = Arc::new(MemoryMatchStore::new());
//! let trust = Arc::new(MemoryTrustSafetyStore::new());
//! let undo = Arc::new(UndoService::new(
//!     likes.clone(),
//!     matches.clone(),
//!     Arc::new(MemoryUndoStore::new()),
//! ));
//! let matching = MatchingService::new(users, likes, matches, trust, Arc::new(SystemClock))
//!     .with_undo(undo);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod matching;
pub mod models;
pub mod recommendation;
pub mod relationship;
pub mod storage;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, StorageError};

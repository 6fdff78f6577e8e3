//! Candidate discovery, compatibility scoring, swipe recording, and undo.

mod candidates;
mod quality;
mod service;
mod undo;

pub use candidates::CandidateFinder;
pub use quality::{DimensionScores, MatchQualityService, QualityResult, MAX_HIGHLIGHTS};
pub use service::{MatchingService, SwipeOutcome};
pub use undo::UndoService;

//! Collaborator contracts consumed by the engine. Implementations live
//! outside the core (SQL, KV, whatever); [`memory`] provides in-memory
//! reference implementations used by the test suite and by embedders that
//! do not need durability.
//!
//! Mutating operations are serialized per unordered user pair at this
//! boundary: `MatchStore::insert_if_absent` keyed by the deterministic
//! match id and `LikeStore::upsert` keyed by the ordered pair are the
//! concurrency-safety mechanism, not in-process locks.

pub mod memory;

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{
    EndReason, FriendRequest, Like, Match, Notification, Standout, SwipeDirection, UndoState, User,
};

pub trait UserStore: Send + Sync {
    fn get(&self, id: Uuid) -> Result<Option<User>, StorageError>;
    fn find_active(&self) -> Result<Vec<User>, StorageError>;
    fn save(&self, user: &User) -> Result<(), StorageError>;
}

pub trait LikeStore: Send + Sync {
    /// Insert or replace the row for the ordered `(from, to)` pair.
    fn upsert(&self, like: &Like) -> Result<(), StorageError>;
    fn get(&self, from: Uuid, to: Uuid) -> Result<Option<Like>, StorageError>;
    fn exists(&self, from: Uuid, to: Uuid) -> Result<bool, StorageError>;
    /// Returns true when a row existed and was removed.
    fn delete(&self, from: Uuid, to: Uuid) -> Result<bool, StorageError>;
    /// Count of swipes in the given direction recorded by `user` on `day`.
    fn count_on_day(
        &self,
        user: Uuid,
        direction: SwipeDirection,
        day: NaiveDate,
    ) -> Result<u32, StorageError>;
    /// All likes/passes targeting `user`.
    fn find_incoming(&self, user: Uuid) -> Result<Vec<Like>, StorageError>;
    /// Every user `from` has already liked or passed on.
    fn swiped_user_ids(&self, from: Uuid) -> Result<HashSet<Uuid>, StorageError>;
}

pub trait MatchStore: Send + Sync {
    /// Insert keyed by the deterministic match id; when a row already
    /// exists for that id, return it unchanged. This is the idempotency
    /// guarantee mutual-match creation relies on.
    fn insert_if_absent(&self, m: &Match) -> Result<Match, StorageError>;
    fn get(&self, id: &str) -> Result<Option<Match>, StorageError>;
    fn get_by_users(&self, a: Uuid, b: Uuid) -> Result<Option<Match>, StorageError>;
    /// Persist a state transition.
    fn save(&self, m: &Match) -> Result<(), StorageError>;
    /// Retract a match. Only UndoService calls this, immediately after
    /// creation. Returns true when a row existed and was removed.
    fn remove(&self, id: &str) -> Result<bool, StorageError>;
    fn matches_for(&self, user: Uuid) -> Result<Vec<Match>, StorageError>;
}

pub trait TrustSafetyStore: Send + Sync {
    /// True when either user blocks the other.
    fn is_blocked(&self, a: Uuid, b: Uuid) -> Result<bool, StorageError>;
    /// Every user `user` has a block relation with, in either direction.
    fn blocked_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError>;
    fn record_block(&self, blocker: Uuid, blocked: Uuid) -> Result<(), StorageError>;
}

pub trait SocialStore: Send + Sync {
    fn save_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError>;
    fn update_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError>;
    fn get_friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>, StorageError>;
    /// The pending request between the unordered pair, if any.
    fn pending_request_between(&self, a: Uuid, b: Uuid)
        -> Result<Option<FriendRequest>, StorageError>;
    fn pending_requests_for(&self, user: Uuid) -> Result<Vec<FriendRequest>, StorageError>;
    fn queue_notification(&self, notification: &Notification) -> Result<(), StorageError>;
    fn notifications_for(&self, user: Uuid) -> Result<Vec<Notification>, StorageError>;
    /// Archive the conversation between the pair; a no-op when none exists.
    fn archive_conversation(&self, a: Uuid, b: Uuid, reason: EndReason)
        -> Result<(), StorageError>;
}

pub trait UndoStore: Send + Sync {
    /// Overwrite the single undo slot for the user.
    fn put(&self, state: &UndoState) -> Result<(), StorageError>;
    fn get(&self, user: Uuid) -> Result<Option<UndoState>, StorageError>;
    fn clear(&self, user: Uuid) -> Result<(), StorageError>;
}

/// Daily-pick viewed flags and the cached standout lists - the only
/// persisted state behind the otherwise recomputed recommendations.
pub trait EngagementStore: Send + Sync {
    fn is_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<bool, StorageError>;
    fn mark_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<(), StorageError>;
    fn standouts_for(&self, user: Uuid, date: NaiveDate) -> Result<Vec<Standout>, StorageError>;
    fn save_standouts(&self, user: Uuid, date: NaiveDate, standouts: &[Standout])
        -> Result<(), StorageError>;
    fn mark_standout_viewed(
        &self,
        user: Uuid,
        standout_user: Uuid,
        date: NaiveDate,
    ) -> Result<(), StorageError>;
}

/// Key helper shared by implementations: unordered pair normalized to
/// (smaller, larger).
pub(crate) fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

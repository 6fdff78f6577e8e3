//! In-memory store implementations. Thread-safe via `RwLock`; the
//! insert-if-absent and upsert semantics the engine relies on map onto
//! `HashMap::entry` here, and onto unique constraints in a SQL adapter.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{
    EndReason, FriendRequest, FriendRequestStatus, Like, Match, Notification, Standout,
    SwipeDirection, UndoState, User,
};
use crate::storage::{
    ordered_pair, EngagementStore, LikeStore, MatchStore, SocialStore, TrustSafetyStore,
    UndoStore, UserStore,
};

fn lock_poisoned() -> StorageError {
    StorageError::new("store lock poisoned")
}

// --- Users ---

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn get(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.get(&id).cloned())
    }

    fn find_active(&self) -> Result<Vec<User>, StorageError> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.values().filter(|u| u.is_active()).cloned().collect())
    }

    fn save(&self, user: &User) -> Result<(), StorageError> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        users.insert(user.id, user.clone());
        Ok(())
    }
}

// --- Likes ---

#[derive(Debug, Default)]
pub struct MemoryLikeStore {
    likes: RwLock<HashMap<(Uuid, Uuid), Like>>,
}

impl MemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LikeStore for MemoryLikeStore {
    fn upsert(&self, like: &Like) -> Result<(), StorageError> {
        let mut likes = self.likes.write().map_err(|_| lock_poisoned())?;
        likes.insert((like.from, like.to), *like);
        Ok(())
    }

    fn get(&self, from: Uuid, to: Uuid) -> Result<Option<Like>, StorageError> {
        let likes = self.likes.read().map_err(|_| lock_poisoned())?;
        Ok(likes.get(&(from, to)).copied())
    }

    fn exists(&self, from: Uuid, to: Uuid) -> Result<bool, StorageError> {
        let likes = self.likes.read().map_err(|_| lock_poisoned())?;
        Ok(likes.contains_key(&(from, to)))
    }

    fn delete(&self, from: Uuid, to: Uuid) -> Result<bool, StorageError> {
        let mut likes = self.likes.write().map_err(|_| lock_poisoned())?;
        Ok(likes.remove(&(from, to)).is_some())
    }

    fn count_on_day(
        &self,
        user: Uuid,
        direction: SwipeDirection,
        day: NaiveDate,
    ) -> Result<u32, StorageError> {
        let likes = self.likes.read().map_err(|_| lock_poisoned())?;
        let count = likes
            .values()
            .filter(|l| {
                l.from == user && l.direction == direction && l.created_at.date_naive() == day
            })
            .count();
        Ok(count as u32)
    }

    fn find_incoming(&self, user: Uuid) -> Result<Vec<Like>, StorageError> {
        let likes = self.likes.read().map_err(|_| lock_poisoned())?;
        Ok(likes.values().filter(|l| l.to == user).copied().collect())
    }

    fn swiped_user_ids(&self, from: Uuid) -> Result<HashSet<Uuid>, StorageError> {
        let likes = self.likes.read().map_err(|_| lock_poisoned())?;
        Ok(likes
            .values()
            .filter(|l| l.from == from)
            .map(|l| l.to)
            .collect())
    }
}

// --- Matches ---

#[derive(Debug, Default)]
pub struct MemoryMatchStore {
    matches: RwLock<HashMap<String, Match>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryMatchStore {
    fn insert_if_absent(&self, m: &Match) -> Result<Match, StorageError> {
        let mut matches = self.matches.write().map_err(|_| lock_poisoned())?;
        let stored = matches.entry(m.id.clone()).or_insert_with(|| m.clone());
        Ok(stored.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Match>, StorageError> {
        let matches = self.matches.read().map_err(|_| lock_poisoned())?;
        Ok(matches.get(id).cloned())
    }

    fn get_by_users(&self, a: Uuid, b: Uuid) -> Result<Option<Match>, StorageError> {
        self.get(&Match::pair_id(a, b))
    }

    fn save(&self, m: &Match) -> Result<(), StorageError> {
        let mut matches = self.matches.write().map_err(|_| lock_poisoned())?;
        matches.insert(m.id.clone(), m.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut matches = self.matches.write().map_err(|_| lock_poisoned())?;
        Ok(matches.remove(id).is_some())
    }

    fn matches_for(&self, user: Uuid) -> Result<Vec<Match>, StorageError> {
        let matches = self.matches.read().map_err(|_| lock_poisoned())?;
        Ok(matches.values().filter(|m| m.involves(user)).cloned().collect())
    }
}

// --- Trust & safety ---

#[derive(Debug, Default)]
pub struct MemoryTrustSafetyStore {
    blocks: RwLock<HashSet<(Uuid, Uuid)>>,
}

impl MemoryTrustSafetyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustSafetyStore for MemoryTrustSafetyStore {
    fn is_blocked(&self, a: Uuid, b: Uuid) -> Result<bool, StorageError> {
        let blocks = self.blocks.read().map_err(|_| lock_poisoned())?;
        Ok(blocks.contains(&(a, b)) || blocks.contains(&(b, a)))
    }

    fn blocked_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError> {
        let blocks = self.blocks.read().map_err(|_| lock_poisoned())?;
        Ok(blocks
            .iter()
            .filter_map(|&(blocker, blocked)| {
                if blocker == user {
                    Some(blocked)
                } else if blocked == user {
                    Some(blocker)
                } else {
                    None
                }
            })
            .collect())
    }

    fn record_block(&self, blocker: Uuid, blocked: Uuid) -> Result<(), StorageError> {
        let mut blocks = self.blocks.write().map_err(|_| lock_poisoned())?;
        blocks.insert((blocker, blocked));
        Ok(())
    }
}

// --- Social (friend requests, notifications, conversation archival) ---

#[derive(Debug, Default)]
pub struct MemorySocialStore {
    requests: RwLock<HashMap<Uuid, FriendRequest>>,
    notifications: RwLock<Vec<Notification>>,
    archived: RwLock<HashMap<(Uuid, Uuid), EndReason>>,
}

impl MemorySocialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: the archival reason recorded for a pair, if any.
    pub fn archived_reason(&self, a: Uuid, b: Uuid) -> Option<EndReason> {
        self.archived
            .read()
            .ok()
            .and_then(|m| m.get(&ordered_pair(a, b)).copied())
    }
}

impl SocialStore for MemorySocialStore {
    fn save_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError> {
        let mut requests = self.requests.write().map_err(|_| lock_poisoned())?;
        requests.insert(request.id, request.clone());
        Ok(())
    }

    fn update_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError> {
        self.save_friend_request(request)
    }

    fn get_friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>, StorageError> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        Ok(requests.get(&id).cloned())
    }

    fn pending_request_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<FriendRequest>, StorageError> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        Ok(requests
            .values()
            .find(|r| {
                r.status == FriendRequestStatus::Pending
                    && ordered_pair(r.from, r.to) == ordered_pair(a, b)
            })
            .cloned())
    }

    fn pending_requests_for(&self, user: Uuid) -> Result<Vec<FriendRequest>, StorageError> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        let mut pending: Vec<FriendRequest> = requests
            .values()
            .filter(|r| r.to == user && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        Ok(pending)
    }

    fn queue_notification(&self, notification: &Notification) -> Result<(), StorageError> {
        let mut notifications = self.notifications.write().map_err(|_| lock_poisoned())?;
        notifications.push(notification.clone());
        Ok(())
    }

    fn notifications_for(&self, user: Uuid) -> Result<Vec<Notification>, StorageError> {
        let notifications = self.notifications.read().map_err(|_| lock_poisoned())?;
        Ok(notifications
            .iter()
            .filter(|n| n.recipient == user)
            .cloned()
            .collect())
    }

    fn archive_conversation(
        &self,
        a: Uuid,
        b: Uuid,
        reason: EndReason,
    ) -> Result<(), StorageError> {
        let mut archived = self.archived.write().map_err(|_| lock_poisoned())?;
        archived.insert(ordered_pair(a, b), reason);
        Ok(())
    }
}

// --- Undo ---

#[derive(Debug, Default)]
pub struct MemoryUndoStore {
    slots: RwLock<HashMap<Uuid, UndoState>>,
}

impl MemoryUndoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UndoStore for MemoryUndoStore {
    fn put(&self, state: &UndoState) -> Result<(), StorageError> {
        let mut slots = self.slots.write().map_err(|_| lock_poisoned())?;
        slots.insert(state.user_id, state.clone());
        Ok(())
    }

    fn get(&self, user: Uuid) -> Result<Option<UndoState>, StorageError> {
        let slots = self.slots.read().map_err(|_| lock_poisoned())?;
        Ok(slots.get(&user).cloned())
    }

    fn clear(&self, user: Uuid) -> Result<(), StorageError> {
        let mut slots = self.slots.write().map_err(|_| lock_poisoned())?;
        slots.remove(&user);
        Ok(())
    }
}

// --- Engagement (daily pick views, standout cache) ---

#[derive(Debug, Default)]
pub struct MemoryEngagementStore {
    pick_views: RwLock<HashSet<(Uuid, NaiveDate)>>,
    standouts: RwLock<HashMap<(Uuid, NaiveDate), Vec<Standout>>>,
}

impl MemoryEngagementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EngagementStore for MemoryEngagementStore {
    fn is_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<bool, StorageError> {
        let views = self.pick_views.read().map_err(|_| lock_poisoned())?;
        Ok(views.contains(&(user, date)))
    }

    fn mark_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<(), StorageError> {
        let mut views = self.pick_views.write().map_err(|_| lock_poisoned())?;
        views.insert((user, date));
        Ok(())
    }

    fn standouts_for(&self, user: Uuid, date: NaiveDate) -> Result<Vec<Standout>, StorageError> {
        let standouts = self.standouts.read().map_err(|_| lock_poisoned())?;
        Ok(standouts.get(&(user, date)).cloned().unwrap_or_default())
    }

    fn save_standouts(
        &self,
        user: Uuid,
        date: NaiveDate,
        entries: &[Standout],
    ) -> Result<(), StorageError> {
        let mut standouts = self.standouts.write().map_err(|_| lock_poisoned())?;
        standouts.insert((user, date), entries.to_vec());
        Ok(())
    }

    fn mark_standout_viewed(
        &self,
        user: Uuid,
        standout_user: Uuid,
        date: NaiveDate,
    ) -> Result<(), StorageError> {
        let mut standouts = self.standouts.write().map_err(|_| lock_poisoned())?;
        if let Some(entries) = standouts.get_mut(&(user, date)) {
            for entry in entries.iter_mut() {
                if entry.standout_user_id == standout_user {
                    entry.viewed = true;
                }
            }
        }
        Ok(())
    }
}

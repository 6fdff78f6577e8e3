use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::User;

// --- Like ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Like,
    Pass,
}

/// One logical row per ordered `(from, to)` pair. A new swipe from the same
/// source to the same target overwrites the prior direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub from: Uuid,
    pub to: Uuid,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(from: Uuid, to: Uuid, direction: SwipeDirection, now: DateTime<Utc>) -> Self {
        Self { from, to, direction, created_at: now }
    }
}

// --- Match ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    Active,
    Friends,
    Unmatched,
    GracefulExit,
    Blocked,
}

impl MatchState {
    /// The forward-only transition table. Idempotent re-entry
    /// (`GracefulExit -> GracefulExit`, `Blocked -> Blocked`) is handled by
    /// the transition service as a no-op, not here.
    pub fn can_transition_to(self, to: MatchState) -> bool {
        match self {
            Self::Active => matches!(
                to,
                Self::Friends | Self::Unmatched | Self::GracefulExit | Self::Blocked
            ),
            Self::Friends => matches!(to, Self::Unmatched | Self::GracefulExit | Self::Blocked),
            Self::Unmatched | Self::GracefulExit | Self::Blocked => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Unmatched | Self::GracefulExit | Self::Blocked)
    }
}

/// Why a relationship ended or a conversation was archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    FriendZone,
    GracefulExit,
    Unmatch,
    Block,
}

/// A mutual-like match. The id is a pure function of the unordered user
/// pair, so creation is idempotent regardless of which side completes the
/// mutual like: `user_a` is always the lexicographically smaller uuid.
///
/// Once created a match is never deleted (only state-transitioned); the
/// single exception is UndoService retracting a just-created match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub state: MatchState,
    pub matched_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<Uuid>,
    pub end_reason: Option<EndReason>,
}

impl Match {
    /// Deterministic id for an unordered pair: sorted uuids joined by `_`.
    /// Insert-if-absent keyed on this id is what prevents duplicate
    /// matches, without any application-level locking.
    pub fn pair_id(a: Uuid, b: Uuid) -> String {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        format!("{lo}_{hi}")
    }

    pub fn new(a: Uuid, b: Uuid, now: DateTime<Utc>) -> Self {
        debug_assert_ne!(a, b, "cannot match a user with themselves");
        let (user_a, user_b) = if a < b { (a, b) } else { (b, a) };
        Self {
            id: Self::pair_id(a, b),
            user_a,
            user_b,
            state: MatchState::Active,
            matched_at: now,
            ended_at: None,
            ended_by: None,
            end_reason: None,
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    pub fn other_user(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_a == user_id {
            Some(self.user_b)
        } else if self.user_b == user_id {
            Some(self.user_a)
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == MatchState::Active
    }

    fn transition(&mut self, to: MatchState) -> EngineResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(EngineError::IllegalTransition { from: self.state, to });
        }
        self.state = to;
        Ok(())
    }

    /// `Active -> Friends`. The relationship continues in a new form, so no
    /// end metadata is recorded.
    pub fn to_friends(&mut self) -> EngineResult<()> {
        self.transition(MatchState::Friends)
    }

    pub fn unmatch(&mut self, by: Uuid, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition(MatchState::Unmatched)?;
        self.end(by, now, EndReason::Unmatch);
        Ok(())
    }

    pub fn graceful_exit(&mut self, by: Uuid, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition(MatchState::GracefulExit)?;
        self.end(by, now, EndReason::GracefulExit);
        Ok(())
    }

    pub fn block(&mut self, by: Uuid, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition(MatchState::Blocked)?;
        self.end(by, now, EndReason::Block);
        Ok(())
    }

    fn end(&mut self, by: Uuid, now: DateTime<Utc>, reason: EndReason) {
        self.ended_at = Some(now);
        self.ended_by = Some(by);
        self.end_reason = Some(reason);
    }
}

// --- Friend requests and notifications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// A proposal to move a match to the friend zone. At most one `Pending`
/// request exists per unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    pub message: String,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    pub fn new(from: Uuid, to: Uuid, message: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            message,
            status: FriendRequestStatus::Pending,
            created_at: now,
            responded_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    FriendRequest,
    FriendRequestAccepted,
    FriendRequestDeclined,
    GracefulExit,
}

/// A queued in-app notification. Delivery transport is outside the engine;
/// we only persist the queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            kind,
            title: title.into(),
            body: body.into(),
            created_at: now,
        }
    }
}

// --- Undo ---

/// The single most recent reversible swipe for a user. Overwritten by each
/// new swipe; not a history stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoState {
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub direction: SwipeDirection,
    /// Set when that swipe completed a mutual like and created a match.
    pub match_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

// --- Recommendations ---

/// The one deterministic candidate of the day for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPick {
    pub user: User,
    pub date: NaiveDate,
    pub reason: String,
    pub already_seen: bool,
}

/// One entry of the ranked top-K standouts list for a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standout {
    pub seeker_id: Uuid,
    pub standout_user_id: Uuid,
    pub date: NaiveDate,
    /// 1-based position in the ranked list.
    pub rank: u32,
    /// Rounded percentage of the overall quality score.
    pub score: u32,
    pub reason: String,
    pub viewed: bool,
}

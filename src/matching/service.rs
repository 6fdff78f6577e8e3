use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::matching::UndoService;
use crate::models::{Like, Match, SwipeDirection, User};
use crate::recommendation::RecommendationService;
use crate::storage::{LikeStore, MatchStore, TrustSafetyStore, UserStore};

/// What a single swipe amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum SwipeOutcome {
    /// The like completed a mutual pair and a match exists.
    Matched(Match),
    Liked,
    Passed,
    /// The daily quota for this direction is exhausted; nothing was
    /// recorded.
    LimitReached { direction: SwipeDirection },
}

/// Records swipes and turns mutual likes into matches.
///
/// Match creation is idempotent without any in-process locking: the match
/// id is a pure function of the unordered pair and the store inserts
/// keyed by it, so duplicate or concurrent calls converge on one row.
pub struct MatchingService {
    users: Arc<dyn UserStore>,
    likes: Arc<dyn LikeStore>,
    matches: Arc<dyn MatchStore>,
    trust: Arc<dyn TrustSafetyStore>,
    clock: Arc<dyn Clock>,
    undo: Option<Arc<UndoService>>,
    recommendations: Option<Arc<RecommendationService>>,
}

impl MatchingService {
    pub fn new(
        users: Arc<dyn UserStore>,
        likes: Arc<dyn LikeStore>,
        matches: Arc<dyn MatchStore>,
        trust: Arc<dyn TrustSafetyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            likes,
            matches,
            trust,
            clock,
            undo: None,
            recommendations: None,
        }
    }

    /// Wire in undo tracking; every recorded swipe then refreshes the
    /// actor's undo slot.
    pub fn with_undo(mut self, undo: Arc<UndoService>) -> Self {
        self.undo = Some(undo);
        self
    }

    /// Wire in quota enforcement for [`MatchingService::swipe`].
    pub fn with_recommendations(mut self, recommendations: Arc<RecommendationService>) -> Self {
        self.recommendations = Some(recommendations);
        self
    }

    /// Records the swipe and reports whether it produced a match. `None`
    /// means no match (a pass, or a like with no reciprocal like yet).
    ///
    /// Re-recording an already-mutual like returns the existing match
    /// unchanged.
    pub fn record_like(
        &self,
        from: Uuid,
        to: Uuid,
        direction: SwipeDirection,
    ) -> EngineResult<Option<Match>> {
        self.check_preconditions(from, to)?;

        let now = self.clock.now();
        self.likes.upsert(&Like::new(from, to, direction, now))?;

        if direction == SwipeDirection::Pass {
            self.track_undo(from, to, direction, None, now)?;
            return Ok(None);
        }

        let reciprocal = self
            .likes
            .get(to, from)?
            .is_some_and(|like| like.direction == SwipeDirection::Like);
        if !reciprocal {
            self.track_undo(from, to, direction, None, now)?;
            return Ok(None);
        }

        // Pre-read only for undo bookkeeping; uniqueness is still enforced
        // by the keyed insert below.
        let pre_existing = self.matches.get(&Match::pair_id(from, to))?.is_some();
        let stored = self.matches.insert_if_absent(&Match::new(from, to, now))?;
        let created_id = (!pre_existing).then(|| stored.id.clone());
        self.track_undo(from, to, direction, created_id, now)?;

        if !pre_existing {
            tracing::info!(match_id = %stored.id, "mutual like, match created");
        }
        Ok(Some(stored))
    }

    /// Quota-gated swipe: checks the daily limit, records the swipe, and
    /// reports the outcome. Without a wired RecommendationService there is
    /// no quota.
    pub fn swipe(
        &self,
        from: Uuid,
        to: Uuid,
        direction: SwipeDirection,
    ) -> EngineResult<SwipeOutcome> {
        if let Some(recommendations) = &self.recommendations {
            if !recommendations.can_swipe(from, direction)? {
                return Ok(SwipeOutcome::LimitReached { direction });
            }
        }
        match self.record_like(from, to, direction)? {
            Some(m) => Ok(SwipeOutcome::Matched(m)),
            None if direction == SwipeDirection::Like => Ok(SwipeOutcome::Liked),
            None => Ok(SwipeOutcome::Passed),
        }
    }

    /// Users who liked `user` and are still awaiting a swipe back, newest
    /// like first. Excludes anyone blocked, inactive, already swiped on,
    /// or already matched with.
    pub fn pending_likers(&self, user: Uuid) -> EngineResult<Vec<User>> {
        let mut incoming: Vec<Like> = self
            .likes
            .find_incoming(user)?
            .into_iter()
            .filter(|like| like.direction == SwipeDirection::Like)
            .collect();
        incoming.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut likers = Vec::new();
        for like in incoming {
            if self.likes.exists(user, like.from)? {
                continue;
            }
            if self.trust.is_blocked(user, like.from)? {
                continue;
            }
            if self.matches.get_by_users(user, like.from)?.is_some() {
                continue;
            }
            if let Some(liker) = self.users.get(like.from)? {
                if liker.is_active() {
                    likers.push(liker);
                }
            }
        }
        Ok(likers)
    }

    fn check_preconditions(&self, from: Uuid, to: Uuid) -> EngineResult<()> {
        if from == to {
            return Err(EngineError::validation("cannot swipe on yourself"));
        }
        let actor = self
            .users
            .get(from)?
            .ok_or_else(|| EngineError::validation("acting user does not exist"))?;
        if !actor.is_active() {
            return Err(EngineError::validation("acting user is not active"));
        }
        if self.users.get(to)?.is_none() {
            return Err(EngineError::validation("target user does not exist"));
        }
        if self.trust.is_blocked(from, to)? {
            return Err(EngineError::validation(
                "a block relation exists between these users",
            ));
        }
        Ok(())
    }

    fn track_undo(
        &self,
        from: Uuid,
        to: Uuid,
        direction: SwipeDirection,
        match_id: Option<String>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> EngineResult<()> {
        if let Some(undo) = &self.undo {
            undo.record_swipe(from, to, direction, match_id, now)?;
        }
        Ok(())
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{SwipeDirection, UndoState};
use crate::storage::{LikeStore, MatchStore, UndoStore};

/// Reverts the single most recent swipe per user. There is no history
/// stack: each new swipe overwrites the slot, so only the latest action is
/// ever reversible, and it stays reversible until the next swipe replaces
/// it.
pub struct UndoService {
    likes: Arc<dyn LikeStore>,
    matches: Arc<dyn MatchStore>,
    undo: Arc<dyn UndoStore>,
}

impl UndoService {
    pub fn new(
        likes: Arc<dyn LikeStore>,
        matches: Arc<dyn MatchStore>,
        undo: Arc<dyn UndoStore>,
    ) -> Self {
        Self { likes, matches, undo }
    }

    /// Called by the matching service after every recorded swipe.
    /// `match_id` is set when that swipe completed a mutual like.
    pub fn record_swipe(
        &self,
        user: Uuid,
        target: Uuid,
        direction: SwipeDirection,
        match_id: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.undo.put(&UndoState {
            user_id: user,
            target_id: target,
            direction,
            match_id,
            recorded_at: now,
        })?;
        Ok(())
    }

    pub fn can_undo(&self, user: Uuid) -> EngineResult<bool> {
        Ok(self.undo.get(user)?.is_some())
    }

    /// The currently reversible swipe, if any.
    pub fn last_swipe(&self, user: Uuid) -> EngineResult<Option<UndoState>> {
        Ok(self.undo.get(user)?)
    }

    /// Reverts the tracked swipe: deletes the Like row and, when the swipe
    /// created a match, retracts that match through the same keyed store
    /// operation that created it. Returns `false`, not an error, when
    /// there is nothing to undo.
    pub fn undo(&self, user: Uuid) -> EngineResult<bool> {
        let Some(state) = self.undo.get(user)? else {
            return Ok(false);
        };

        self.likes.delete(state.user_id, state.target_id)?;
        if let Some(match_id) = &state.match_id {
            self.matches.remove(match_id)?;
        }
        self.undo.clear(user)?;

        tracing::info!(
            user = %user,
            target = %state.target_id,
            reverted_match = state.match_id.is_some(),
            "swipe undone"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Like, Match};
    use crate::storage::memory::{MemoryLikeStore, MemoryMatchStore, MemoryUndoStore};
    use chrono::TimeZone;

    fn service() -> (UndoService, Arc<MemoryLikeStore>, Arc<MemoryMatchStore>) {
        let likes = Arc::new(MemoryLikeStore::new());
        let matches = Arc::new(MemoryMatchStore::new());
        let undo = Arc::new(MemoryUndoStore::new());
        (
            UndoService::new(likes.clone(), matches.clone(), undo),
            likes,
            matches,
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn undo_with_empty_slot_returns_false() {
        let (service, _, _) = service();
        assert!(!service.undo(Uuid::new_v4()).unwrap());
        assert!(!service.can_undo(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn undo_deletes_the_like_row() {
        let (service, likes, _) = service();
        let user = Uuid::new_v4();
        let target = Uuid::new_v4();
        likes
            .upsert(&Like::new(user, target, SwipeDirection::Like, now()))
            .unwrap();
        service
            .record_swipe(user, target, SwipeDirection::Like, None, now())
            .unwrap();

        assert!(service.undo(user).unwrap());
        assert!(!likes.exists(user, target).unwrap());
        // slot consumed
        assert!(!service.undo(user).unwrap());
    }

    #[test]
    fn undo_retracts_a_created_match() {
        let (service, likes, matches) = service();
        let user = Uuid::new_v4();
        let target = Uuid::new_v4();
        likes
            .upsert(&Like::new(user, target, SwipeDirection::Like, now()))
            .unwrap();
        let m = matches.insert_if_absent(&Match::new(user, target, now())).unwrap();
        service
            .record_swipe(user, target, SwipeDirection::Like, Some(m.id.clone()), now())
            .unwrap();

        assert!(service.undo(user).unwrap());
        assert!(matches.get(&m.id).unwrap().is_none());
    }

    #[test]
    fn newer_swipe_supersedes_the_slot() {
        let (service, likes, _) = service();
        let user = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        likes
            .upsert(&Like::new(user, first, SwipeDirection::Like, now()))
            .unwrap();
        likes
            .upsert(&Like::new(user, second, SwipeDirection::Pass, now()))
            .unwrap();
        service
            .record_swipe(user, first, SwipeDirection::Like, None, now())
            .unwrap();
        service
            .record_swipe(user, second, SwipeDirection::Pass, None, now())
            .unwrap();

        assert!(service.undo(user).unwrap());
        // only the newer swipe was reverted
        assert!(likes.exists(user, first).unwrap());
        assert!(!likes.exists(user, second).unwrap());
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::matching::{CandidateFinder, MatchQualityService};
use crate::models::{DailyPick, Standout, SwipeDirection, User};
use crate::storage::{EngagementStore, LikeStore};

const GENERIC_REASONS: &[&str] = &[
    "Our algorithm thinks you might click!",
    "Something different today!",
    "Expand your horizons!",
    "Why not give them a chance?",
    "Could be a pleasant surprise!",
];

/// Today's swipe usage for one user. `None` remaining means the quota is
/// unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStatus {
    pub date: NaiveDate,
    pub likes_used: u32,
    pub likes_remaining: Option<u32>,
    pub passes_used: u32,
    pub passes_remaining: Option<u32>,
}

/// Daily quota gating plus the two deterministic discovery surfaces: the
/// single pick of the day and the ranked standouts list.
///
/// Everything date-dependent reads the injected clock, so rollover is
/// testable, and every random choice uses a seeded generator local to the
/// call, so repeated calls on the same day return identical results.
pub struct RecommendationService {
    finder: Arc<CandidateFinder>,
    quality: Arc<MatchQualityService>,
    likes: Arc<dyn LikeStore>,
    engagement: Arc<dyn EngagementStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl RecommendationService {
    pub fn new(
        finder: Arc<CandidateFinder>,
        quality: Arc<MatchQualityService>,
        likes: Arc<dyn LikeStore>,
        engagement: Arc<dyn EngagementStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self { finder, quality, likes, engagement, clock, config }
    }

    // --- Daily quota ---

    pub fn can_swipe(&self, user: Uuid, direction: SwipeDirection) -> EngineResult<bool> {
        match self.limit_for(direction) {
            None => Ok(true),
            Some(limit) => {
                let used = self.likes.count_on_day(user, direction, self.clock.today())?;
                Ok(used < limit)
            }
        }
    }

    /// Swipes left today in the given direction; `None` when unlimited.
    pub fn remaining_swipes(
        &self,
        user: Uuid,
        direction: SwipeDirection,
    ) -> EngineResult<Option<u32>> {
        match self.limit_for(direction) {
            None => Ok(None),
            Some(limit) => {
                let used = self.likes.count_on_day(user, direction, self.clock.today())?;
                Ok(Some(limit.saturating_sub(used)))
            }
        }
    }

    pub fn status(&self, user: Uuid) -> EngineResult<DailyStatus> {
        let today = self.clock.today();
        let likes_used = self.likes.count_on_day(user, SwipeDirection::Like, today)?;
        let passes_used = self.likes.count_on_day(user, SwipeDirection::Pass, today)?;
        Ok(DailyStatus {
            date: today,
            likes_used,
            likes_remaining: self
                .limit_for(SwipeDirection::Like)
                .map(|limit| limit.saturating_sub(likes_used)),
            passes_used,
            passes_remaining: self
                .limit_for(SwipeDirection::Pass)
                .map(|limit| limit.saturating_sub(passes_used)),
        })
    }

    fn limit_for(&self, direction: SwipeDirection) -> Option<u32> {
        match direction {
            SwipeDirection::Like => {
                (!self.config.unlimited_likes).then_some(self.config.daily_like_limit)
            }
            SwipeDirection::Pass => {
                (!self.config.unlimited_passes).then_some(self.config.daily_pass_limit)
            }
        }
    }

    // --- Daily pick ---

    /// One deterministic candidate per user per calendar day: the seed is a
    /// pure function of the date and the seeker's id, so repeated calls on
    /// the same day agree on both the candidate and the reason, and a new
    /// day may pick someone else.
    pub fn daily_pick(&self, seeker: &User) -> EngineResult<Option<DailyPick>> {
        let today = self.clock.today();
        let mut pool = self.finder.find_for(seeker)?;
        if pool.is_empty() {
            return Ok(None);
        }

        let seed = (today.num_days_from_ce() as u64).wrapping_add(fold_uuid(seeker.id));
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = pool.swap_remove(rng.gen_range(0..pool.len()));

        let reason = self.pick_reason(seeker, &picked, seed);
        let already_seen = self.engagement.is_pick_viewed(seeker.id, today)?;

        tracing::debug!(seeker = %seeker.id, picked = %picked.id, %today, "daily pick computed");
        Ok(Some(DailyPick { user: picked, date: today, reason, already_seen }))
    }

    pub fn mark_pick_viewed(&self, user: Uuid) -> EngineResult<()> {
        self.engagement.mark_pick_viewed(user, self.clock.today())?;
        Ok(())
    }

    /// First applicable contextual reason in priority order; a seeded
    /// generic phrase when none applies.
    fn pick_reason(&self, seeker: &User, picked: &User, seed: u64) -> String {
        let quality = self.quality.compute(seeker, picked);

        if let Some(km) = quality.distance_km {
            if km < self.config.nearby_distance_km {
                return "Lives nearby!".to_string();
            }
            if km < self.config.close_distance_km {
                return "Close enough for coffee!".to_string();
            }
        }
        if quality.age_difference <= self.config.similar_age_years {
            return "Similar age".to_string();
        }
        if quality.age_difference <= self.config.compatible_age_years {
            return "Age-appropriate match".to_string();
        }
        if let (Some(mine), Some(theirs)) = (seeker.looking_for, picked.looking_for) {
            if mine == theirs {
                return "Looking for the same thing".to_string();
            }
        }
        if let (Some(mine), Some(theirs)) = (seeker.kids_stance, picked.kids_stance) {
            if mine == theirs {
                return "Same stance on kids".to_string();
            }
        }
        match quality.shared_interests.len() {
            0 => {}
            n if n >= self.config.min_shared_interests => {
                return "Many shared interests!".to_string();
            }
            _ => return "Some shared interests".to_string(),
        }

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(fold_uuid(picked.id)));
        GENERIC_REASONS[rng.gen_range(0..GENERIC_REASONS.len())].to_string()
    }

    // --- Standouts ---

    /// Top-K eligible candidates by overall quality score, computed once
    /// per day and served from the cache afterward. Candidates featured in
    /// the last `standout_diversity_days` days sit out today's list.
    pub fn standouts(&self, seeker: &User) -> EngineResult<Vec<Standout>> {
        let today = self.clock.today();
        let cached = self.engagement.standouts_for(seeker.id, today)?;
        if !cached.is_empty() {
            return Ok(cached);
        }

        let recently_featured = self.recently_featured(seeker.id, today)?;
        let mut scored: Vec<(User, crate::matching::QualityResult)> = self
            .finder
            .find_for(seeker)?
            .into_iter()
            .filter(|candidate| !recently_featured.contains(&candidate.id))
            .map(|candidate| {
                let quality = self.quality.compute(seeker, &candidate);
                (candidate, quality)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.overall
                .total_cmp(&a.1.overall)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(self.config.max_standouts);

        let standouts: Vec<Standout> = scored
            .iter()
            .enumerate()
            .map(|(index, (candidate, quality))| Standout {
                seeker_id: seeker.id,
                standout_user_id: candidate.id,
                date: today,
                rank: (index + 1) as u32,
                score: quality.percentage(),
                reason: quality
                    .highlights
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "High compatibility".to_string()),
                viewed: false,
            })
            .collect();

        self.engagement.save_standouts(seeker.id, today, &standouts)?;
        tracing::debug!(seeker = %seeker.id, count = standouts.len(), %today, "standouts generated");
        Ok(standouts)
    }

    pub fn mark_standout_viewed(&self, user: Uuid, standout_user: Uuid) -> EngineResult<()> {
        self.engagement
            .mark_standout_viewed(user, standout_user, self.clock.today())?;
        Ok(())
    }

    fn recently_featured(&self, seeker: Uuid, today: NaiveDate) -> EngineResult<HashSet<Uuid>> {
        let mut featured = HashSet::new();
        for days_back in 1..=u64::from(self.config.standout_diversity_days) {
            if let Some(day) = today.checked_sub_days(Days::new(days_back)) {
                for standout in self.engagement.standouts_for(seeker, day)? {
                    featured.insert(standout.standout_user_id);
                }
            }
        }
        Ok(featured)
    }
}

/// xor-fold of a uuid's 128 bits, for seeding.
fn fold_uuid(id: Uuid) -> u64 {
    let bits = id.as_u128();
    (bits >> 64) as u64 ^ bits as u64
}

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::geo::haversine_km;
use crate::models::User;
use crate::storage::{LikeStore, TrustSafetyStore, UserStore};

/// Filters the active-user pool down to eligible candidates for a seeker.
///
/// A candidate passes only if every rule holds: active and not self, mutual
/// gender interest, within the seeker's distance limit (candidates without
/// a location are excluded), inside the configured age brackets, not
/// already swiped on, not blocked in either direction, and clearing every
/// dealbreaker the seeker restricted.
pub struct CandidateFinder {
    users: Arc<dyn UserStore>,
    likes: Arc<dyn LikeStore>,
    trust: Arc<dyn TrustSafetyStore>,
}

impl CandidateFinder {
    pub fn new(
        users: Arc<dyn UserStore>,
        likes: Arc<dyn LikeStore>,
        trust: Arc<dyn TrustSafetyStore>,
    ) -> Self {
        Self { users, likes, trust }
    }

    /// Fetches the active pool and exclusions from storage, then filters.
    pub fn find_for(&self, seeker: &User) -> EngineResult<Vec<User>> {
        let pool = self.users.find_active()?;
        let mut excluded = self.likes.swiped_user_ids(seeker.id)?;
        excluded.extend(self.trust.blocked_user_ids(seeker.id)?);
        Ok(self.filter_pool(seeker, pool, &excluded))
    }

    /// Pure filtering over a supplied pool. Empty input yields an empty
    /// result, never an error.
    pub fn filter_pool(
        &self,
        seeker: &User,
        pool: Vec<User>,
        excluded: &HashSet<Uuid>,
    ) -> Vec<User> {
        let mut candidates: Vec<User> = pool
            .into_iter()
            .filter(|candidate| Self::passes_filters(seeker, candidate, excluded))
            .collect();

        candidates.sort_by(|a, b| Self::compare_candidates(seeker, a, b));

        tracing::debug!(
            seeker = %seeker.id,
            count = candidates.len(),
            "candidate pool filtered"
        );
        candidates
    }

    fn passes_filters(seeker: &User, candidate: &User, excluded: &HashSet<Uuid>) -> bool {
        if candidate.id == seeker.id || !candidate.is_active() {
            return false;
        }
        if excluded.contains(&candidate.id) {
            return false;
        }
        if !seeker.mutually_interested(candidate) {
            return false;
        }
        if !Self::within_distance(seeker, candidate) {
            return false;
        }
        if !Self::ages_compatible(seeker, candidate) {
            return false;
        }
        seeker.dealbreakers.passes(seeker, candidate)
    }

    /// A candidate with no location is excluded outright; when the seeker
    /// has no location the distance limit cannot be measured and is
    /// skipped.
    fn within_distance(seeker: &User, candidate: &User) -> bool {
        let Some(candidate_loc) = candidate.location else {
            return false;
        };
        match seeker.location {
            Some(seeker_loc) => haversine_km(seeker_loc, candidate_loc) <= seeker.max_distance_km,
            None => true,
        }
    }

    /// The age check is driven by the seeker's bracket: no bracket, no
    /// check. When the candidate also configured one, the check is
    /// symmetric.
    fn ages_compatible(seeker: &User, candidate: &User) -> bool {
        let Some(seeker_range) = seeker.age_range else {
            return true;
        };
        if !seeker_range.contains(candidate.age) {
            return false;
        }
        match candidate.age_range {
            Some(candidate_range) => candidate_range.contains(seeker.age),
            None => true,
        }
    }

    /// Ascending distance, then descending shared-interest count, then
    /// candidate id, for a fully deterministic ordering.
    fn compare_candidates(seeker: &User, a: &User, b: &User) -> Ordering {
        let dist_a = Self::distance_to(seeker, a);
        let dist_b = Self::distance_to(seeker, b);
        dist_a
            .total_cmp(&dist_b)
            .then_with(|| {
                seeker
                    .shared_interest_count(b)
                    .cmp(&seeker.shared_interest_count(a))
            })
            .then_with(|| a.id.cmp(&b.id))
    }

    fn distance_to(seeker: &User, candidate: &User) -> f64 {
        match (seeker.location, candidate.location) {
            (Some(s), Some(c)) => haversine_km(s, c),
            _ => f64::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::models::{AgeRange, Gender, Smoking, UserState};
    use crate::storage::memory::{MemoryLikeStore, MemoryTrustSafetyStore, MemoryUserStore};
    use chrono::{TimeZone, Utc};

    fn finder_with(users: Arc<MemoryUserStore>) -> (CandidateFinder, Arc<MemoryLikeStore>, Arc<MemoryTrustSafetyStore>) {
        let likes = Arc::new(MemoryLikeStore::new());
        let trust = Arc::new(MemoryTrustSafetyStore::new());
        let finder = CandidateFinder::new(users, likes.clone(), trust.clone());
        (finder, likes, trust)
    }

    fn active_user(name: &str, age: u32, gender: Gender, lat: f64, lon: f64) -> User {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut u = User::new(Uuid::new_v4(), name, age, gender, now);
        u.state = UserState::Active;
        u.location = Some(GeoPoint::new(lat, lon));
        u.interested_in.insert(match gender {
            Gender::Male => Gender::Female,
            _ => Gender::Male,
        });
        u
    }

    #[test]
    fn distance_limit_excludes_far_candidates() {
        let users = Arc::new(MemoryUserStore::new());
        let mut seeker = active_user("seeker", 30, Gender::Female, 52.5200, 13.4050);
        seeker.max_distance_km = 10.0;

        // ~5 km and ~15 km east of the seeker
        let near = active_user("near", 30, Gender::Male, 52.5200, 13.4786);
        let far = active_user("far", 30, Gender::Male, 52.5200, 13.6258);
        users.save(&near).unwrap();
        users.save(&far).unwrap();
        users.save(&seeker).unwrap();

        let (finder, _, _) = finder_with(users);
        let found = finder.find_for(&seeker).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, near.id);
    }

    #[test]
    fn candidate_without_location_is_excluded() {
        let users = Arc::new(MemoryUserStore::new());
        let seeker = active_user("seeker", 30, Gender::Female, 52.52, 13.40);
        let mut nowhere = active_user("nowhere", 30, Gender::Male, 0.0, 0.0);
        nowhere.location = None;
        users.save(&nowhere).unwrap();
        users.save(&seeker).unwrap();

        let (finder, _, _) = finder_with(users);
        assert!(finder.find_for(&seeker).unwrap().is_empty());
    }

    #[test]
    fn gender_interest_must_be_mutual() {
        let users = Arc::new(MemoryUserStore::new());
        let seeker = active_user("seeker", 30, Gender::Female, 52.52, 13.40);
        let mut uninterested = active_user("u", 30, Gender::Male, 52.52, 13.41);
        uninterested.interested_in.clear();
        uninterested.interested_in.insert(Gender::Male);
        users.save(&uninterested).unwrap();

        let (finder, _, _) = finder_with(users);
        assert!(finder.find_for(&seeker).unwrap().is_empty());
    }

    #[test]
    fn age_bracket_applies_only_when_configured() {
        let users = Arc::new(MemoryUserStore::new());
        let mut seeker = active_user("seeker", 30, Gender::Female, 52.52, 13.40);
        let older = active_user("older", 49, Gender::Male, 52.52, 13.41);
        users.save(&older).unwrap();

        let (finder, _, _) = finder_with(users.clone());
        // No bracket configured: the 49-year-old is eligible.
        assert_eq!(finder.find_for(&seeker).unwrap().len(), 1);

        seeker.age_range = Some(AgeRange::new(25, 40));
        assert!(finder.find_for(&seeker).unwrap().is_empty());
    }

    #[test]
    fn symmetric_age_check_when_both_configured() {
        let users = Arc::new(MemoryUserStore::new());
        let mut seeker = active_user("seeker", 45, Gender::Female, 52.52, 13.40);
        seeker.age_range = Some(AgeRange::new(20, 50));
        let mut candidate = active_user("cand", 30, Gender::Male, 52.52, 13.41);
        candidate.age_range = Some(AgeRange::new(25, 35));
        users.save(&candidate).unwrap();

        let (finder, _, _) = finder_with(users);
        // Seeker (45) is outside the candidate's 25-35 bracket.
        assert!(finder.find_for(&seeker).unwrap().is_empty());
    }

    #[test]
    fn already_swiped_and_blocked_are_excluded() {
        let users = Arc::new(MemoryUserStore::new());
        let seeker = active_user("seeker", 30, Gender::Female, 52.52, 13.40);
        let swiped = active_user("swiped", 30, Gender::Male, 52.52, 13.41);
        let blocked = active_user("blocked", 30, Gender::Male, 52.52, 13.42);
        users.save(&swiped).unwrap();
        users.save(&blocked).unwrap();

        let (finder, likes, trust) = finder_with(users);
        likes
            .upsert(&crate::models::Like::new(
                seeker.id,
                swiped.id,
                crate::models::SwipeDirection::Pass,
                Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            ))
            .unwrap();
        trust.record_block(blocked.id, seeker.id).unwrap();

        assert!(finder.find_for(&seeker).unwrap().is_empty());
    }

    #[test]
    fn dealbreakers_are_hard_filters() {
        let users = Arc::new(MemoryUserStore::new());
        let mut seeker = active_user("seeker", 30, Gender::Female, 52.52, 13.40);
        seeker.dealbreakers.smoking.insert(Smoking::Never);
        let mut smoker = active_user("smoker", 30, Gender::Male, 52.52, 13.41);
        smoker.smoking = Some(Smoking::Regularly);
        let mut nonsmoker = active_user("clean", 30, Gender::Male, 52.52, 13.42);
        nonsmoker.smoking = Some(Smoking::Never);
        users.save(&smoker).unwrap();
        users.save(&nonsmoker).unwrap();

        let (finder, _, _) = finder_with(users);
        let found = finder.find_for(&seeker).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, nonsmoker.id);
    }

    #[test]
    fn ordering_is_distance_then_shared_interests_then_id() {
        let users = Arc::new(MemoryUserStore::new());
        let mut seeker = active_user("seeker", 30, Gender::Female, 52.5200, 13.4050);
        seeker.interests.extend(["hiking".into(), "jazz".into()]);

        let far = active_user("far", 30, Gender::Male, 52.5200, 13.5218);
        let near_plain = active_user("near-plain", 30, Gender::Male, 52.5200, 13.4050);
        let mut near_shared = active_user("near-shared", 30, Gender::Male, 52.5200, 13.4050);
        near_shared.interests.insert("hiking".into());
        // Same coordinates, so the interest tie-break decides.
        users.save(&far).unwrap();
        users.save(&near_plain).unwrap();
        users.save(&near_shared).unwrap();

        let (finder, _, _) = finder_with(users);
        let found = finder.find_for(&seeker).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].id, near_shared.id);
        assert_eq!(found[1].id, near_plain.id);
        assert_eq!(found[2].id, far.id);
    }

    #[test]
    fn empty_pool_yields_empty_result() {
        let users = Arc::new(MemoryUserStore::new());
        let seeker = active_user("seeker", 30, Gender::Female, 52.52, 13.40);
        let (finder, _, _) = finder_with(users);
        assert!(finder.find_for(&seeker).unwrap().is_empty());
    }
}

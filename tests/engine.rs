//! End-to-end scenarios wiring the full engine together over the
//! in-memory stores.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use emberlink::clock::{Clock, FixedClock};
use emberlink::geo::GeoPoint;
use emberlink::matching::{
    CandidateFinder, MatchQualityService, MatchingService, SwipeOutcome, UndoService,
};
use emberlink::models::{Gender, MatchState, SwipeDirection, User, UserState};
use emberlink::recommendation::RecommendationService;
use emberlink::relationship::RelationshipTransitionService;
use emberlink::storage::memory::{
    MemoryEngagementStore, MemoryLikeStore, MemoryMatchStore, MemorySocialStore,
    MemoryTrustSafetyStore, MemoryUndoStore, MemoryUserStore,
};
use emberlink::storage::{LikeStore, MatchStore, SocialStore, UserStore};
use emberlink::{EngineConfig, EngineError};

struct Engine {
    users: Arc<MemoryUserStore>,
    likes: Arc<MemoryLikeStore>,
    matches: Arc<MemoryMatchStore>,
    social: Arc<MemorySocialStore>,
    clock: Arc<FixedClock>,
    finder: Arc<CandidateFinder>,
    quality: Arc<MatchQualityService>,
    matching: MatchingService,
    relationship: RelationshipTransitionService,
    undo: Arc<UndoService>,
    recommendations: Arc<RecommendationService>,
}

fn engine(config: EngineConfig) -> Engine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let users = Arc::new(MemoryUserStore::new());
    let likes = Arc::new(MemoryLikeStore::new());
    let matches = Arc::new(MemoryMatchStore::new());
    let trust = Arc::new(MemoryTrustSafetyStore::new());
    let social = Arc::new(MemorySocialStore::new());
    let engagement = Arc::new(MemoryEngagementStore::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));

    let finder = Arc::new(CandidateFinder::new(
        users.clone(),
        likes.clone(),
        trust.clone(),
    ));
    let quality = Arc::new(MatchQualityService::new(config.clone()));
    let undo = Arc::new(UndoService::new(
        likes.clone(),
        matches.clone(),
        Arc::new(MemoryUndoStore::new()),
    ));
    let recommendations = Arc::new(RecommendationService::new(
        finder.clone(),
        quality.clone(),
        likes.clone(),
        engagement,
        clock.clone(),
        config,
    ));
    let matching = MatchingService::new(
        users.clone(),
        likes.clone(),
        matches.clone(),
        trust.clone(),
        clock.clone(),
    )
    .with_undo(undo.clone())
    .with_recommendations(recommendations.clone());
    let relationship =
        RelationshipTransitionService::new(matches.clone(), social.clone(), trust, clock.clone());

    Engine {
        users,
        likes,
        matches,
        social,
        clock,
        finder,
        quality,
        matching,
        relationship,
        undo,
        recommendations,
    }
}

fn add_user(e: &Engine, name: &str, gender: Gender, lat: f64, lon: f64) -> User {
    let mut u = User::new(Uuid::new_v4(), name, 30, gender, e.clock.now());
    u.state = UserState::Active;
    u.location = Some(GeoPoint::new(lat, lon));
    u.interested_in.insert(match gender {
        Gender::Male => Gender::Female,
        _ => Gender::Male,
    });
    e.users.save(&u).unwrap();
    u
}

#[test]
fn distance_limit_scenario() {
    let e = engine(EngineConfig::default());
    let mut seeker = add_user(&e, "seeker", Gender::Female, 52.5200, 13.4050);
    seeker.max_distance_km = 10.0;
    e.users.save(&seeker).unwrap();

    // ~5 km and ~15 km away
    let near = add_user(&e, "near", Gender::Male, 52.5200, 13.4786);
    let _far = add_user(&e, "far", Gender::Male, 52.5200, 13.6258);

    let pool = e.finder.find_for(&seeker).unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].id, near.id);
}

#[test]
fn mutual_like_to_friend_zone_to_graceful_exit() {
    let e = engine(EngineConfig::default());
    let a = add_user(&e, "a", Gender::Female, 52.52, 13.40);
    let b = add_user(&e, "b", Gender::Male, 52.52, 13.41);

    assert!(e.matching.record_like(a.id, b.id, SwipeDirection::Like).unwrap().is_none());
    let m = e
        .matching
        .record_like(b.id, a.id, SwipeDirection::Like)
        .unwrap()
        .expect("mutual like should match");
    assert_eq!(m.state, MatchState::Active);

    let request = e
        .relationship
        .propose_friend_zone(a.id, b.id, "Let's be friends!")
        .unwrap();
    e.relationship
        .respond_to_friend_request(request.id, b.id, true)
        .unwrap();
    assert_eq!(
        e.matches.get(&m.id).unwrap().unwrap().state,
        MatchState::Friends
    );

    e.relationship.graceful_exit(a.id, b.id).unwrap();
    // repeat is a no-op, still exactly one notification for b
    e.relationship.graceful_exit(a.id, b.id).unwrap();
    let updated = e.matches.get(&m.id).unwrap().unwrap();
    assert_eq!(updated.state, MatchState::GracefulExit);
    assert_eq!(updated.ended_by, Some(a.id));
    let exits = e
        .social
        .notifications_for(b.id)
        .unwrap()
        .into_iter()
        .filter(|n| n.title == "Relationship ended")
        .count();
    assert_eq!(exits, 1);
}

#[test]
fn friend_zone_message_too_short_scenario() {
    let e = engine(EngineConfig::default());
    let a = add_user(&e, "a", Gender::Female, 52.52, 13.40);
    let b = add_user(&e, "b", Gender::Male, 52.52, 13.41);
    e.matching.record_like(a.id, b.id, SwipeDirection::Like).unwrap();
    e.matching.record_like(b.id, a.id, SwipeDirection::Like).unwrap();

    let err = e.relationship.propose_friend_zone(a.id, b.id, "hi").unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let request = e
        .relationship
        .propose_friend_zone(a.id, b.id, "Let's be friends!")
        .unwrap();
    assert!(request.is_pending());
}

#[test]
fn undo_reverts_the_match_it_created() {
    let e = engine(EngineConfig::default());
    let a = add_user(&e, "a", Gender::Female, 52.52, 13.40);
    let b = add_user(&e, "b", Gender::Male, 52.52, 13.41);
    e.matching.record_like(a.id, b.id, SwipeDirection::Like).unwrap();
    let m = e
        .matching
        .record_like(b.id, a.id, SwipeDirection::Like)
        .unwrap()
        .unwrap();

    assert!(e.undo.undo(b.id).unwrap());
    assert!(!e.likes.exists(b.id, a.id).unwrap());
    assert!(e.matches.get(&m.id).unwrap().is_none());
    // a's earlier like survives and their own slot is independent
    assert!(e.likes.exists(a.id, b.id).unwrap());
    assert!(!e.undo.undo(b.id).unwrap());
}

#[test]
fn swipe_outcomes_and_daily_limit() {
    let mut config = EngineConfig::default();
    config.daily_like_limit = 2;
    let e = engine(config);
    let me = add_user(&e, "me", Gender::Female, 52.52, 13.40);
    let first = add_user(&e, "first", Gender::Male, 52.52, 13.41);
    let second = add_user(&e, "second", Gender::Male, 52.52, 13.42);
    let third = add_user(&e, "third", Gender::Male, 52.52, 13.43);

    e.matching.record_like(first.id, me.id, SwipeDirection::Like).unwrap();

    assert!(matches!(
        e.matching.swipe(me.id, first.id, SwipeDirection::Like).unwrap(),
        SwipeOutcome::Matched(_)
    ));
    assert_eq!(
        e.matching.swipe(me.id, second.id, SwipeDirection::Like).unwrap(),
        SwipeOutcome::Liked
    );
    assert_eq!(
        e.matching.swipe(me.id, third.id, SwipeDirection::Like).unwrap(),
        SwipeOutcome::LimitReached { direction: SwipeDirection::Like }
    );
    // passes have their own quota
    assert_eq!(
        e.matching.swipe(me.id, third.id, SwipeDirection::Pass).unwrap(),
        SwipeOutcome::Passed
    );

    let status = e.recommendations.status(me.id).unwrap();
    assert_eq!(status.likes_used, 2);
    assert_eq!(status.likes_remaining, Some(0));
    assert_eq!(status.passes_used, 1);

    // rollover restores the like quota
    e.clock.advance(Duration::days(1));
    assert_eq!(
        e.recommendations
            .remaining_swipes(me.id, SwipeDirection::Like)
            .unwrap(),
        Some(2)
    );
}

#[test]
fn daily_pick_stable_today_may_move_tomorrow() {
    let e = engine(EngineConfig::default());
    let seeker = add_user(&e, "seeker", Gender::Female, 52.52, 13.40);
    for i in 0..20 {
        add_user(&e, &format!("c{i}"), Gender::Male, 52.52, 13.41);
    }

    let first = e.recommendations.daily_pick(&seeker).unwrap().unwrap();
    let again = e.recommendations.daily_pick(&seeker).unwrap().unwrap();
    assert_eq!(first.user.id, again.user.id);
    assert_eq!(first.reason, again.reason);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..7 {
        seen.insert(e.recommendations.daily_pick(&seeker).unwrap().unwrap().user.id);
        e.clock.advance(Duration::days(1));
    }
    assert!(seen.len() > 1, "pick never changed across a week");
}

#[test]
fn quality_score_bounded_for_sparse_profiles() {
    let e = engine(EngineConfig::default());
    let now = e.clock.now();
    let bare_a = User::new(Uuid::new_v4(), "a", 25, Gender::Other, now);
    let bare_b = User::new(Uuid::new_v4(), "b", 52, Gender::Other, now);
    let result = e.quality.compute(&bare_a, &bare_b);
    assert!((0.0..=1.0).contains(&result.overall));
    assert_eq!(result.dimensions.interest, 0.5);
    assert_eq!(result.dimensions.lifestyle, 0.5);
    assert_eq!(result.dimensions.pace, 0.5);
}

#[test]
fn pending_likers_flow_into_matches() {
    let e = engine(EngineConfig::default());
    let me = add_user(&e, "me", Gender::Female, 52.52, 13.40);
    let admirer = add_user(&e, "admirer", Gender::Male, 52.52, 13.41);

    e.matching.record_like(admirer.id, me.id, SwipeDirection::Like).unwrap();
    let likers = e.matching.pending_likers(me.id).unwrap();
    assert_eq!(likers.len(), 1);
    assert_eq!(likers[0].id, admirer.id);

    // swiping back resolves the pending liker either way
    e.matching.record_like(me.id, admirer.id, SwipeDirection::Like).unwrap();
    assert!(e.matching.pending_likers(me.id).unwrap().is_empty());
}

#[test]
fn blocking_removes_a_user_from_discovery() {
    let e = engine(EngineConfig::default());
    let a = add_user(&e, "a", Gender::Female, 52.52, 13.40);
    let b = add_user(&e, "b", Gender::Male, 52.52, 13.41);
    e.matching.record_like(a.id, b.id, SwipeDirection::Like).unwrap();
    e.matching.record_like(b.id, a.id, SwipeDirection::Like).unwrap();
    e.relationship.block(a.id, b.id).unwrap();

    // no further swipes between the pair
    let err = e
        .matching
        .record_like(b.id, a.id, SwipeDirection::Like)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    // and b never appears in a's pool again
    assert!(e.finder.find_for(&a).unwrap().is_empty());
}

#[test]
fn standouts_cache_survives_pool_changes() {
    let mut config = EngineConfig::default();
    config.max_standouts = 2;
    let e = engine(config);
    let seeker = add_user(&e, "seeker", Gender::Female, 52.52, 13.40);
    add_user(&e, "a", Gender::Male, 52.52, 13.41);
    add_user(&e, "b", Gender::Male, 52.52, 13.42);
    add_user(&e, "c", Gender::Male, 52.52, 13.43);

    let today = e.recommendations.standouts(&seeker).unwrap();
    assert_eq!(today.len(), 2);
    assert_eq!(today[0].rank, 1);

    e.recommendations
        .mark_standout_viewed(seeker.id, today[0].standout_user_id)
        .unwrap();
    let again = e.recommendations.standouts(&seeker).unwrap();
    assert_eq!(again[0].standout_user_id, today[0].standout_user_id);
    assert!(again[0].viewed);
}

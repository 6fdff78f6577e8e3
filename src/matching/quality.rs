use serde::Serialize;

use crate::config::EngineConfig;
use crate::geo::haversine_km;
use crate::models::{PacePreferences, User};

/// Per-dimension compatibility scores, each in `[0, 1]`. A dimension with
/// no data on either side scores the neutral 0.5 rather than shifting
/// weight onto the others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionScores {
    pub distance: f64,
    pub age: f64,
    pub interest: f64,
    pub lifestyle: f64,
    pub pace: f64,
}

/// Output of one quality computation. Ephemeral: recomputed on demand,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityResult {
    /// Weighted sum of the dimensions, clamped to `[0, 1]`.
    pub overall: f64,
    pub dimensions: DimensionScores,
    /// Measured distance, absent when either side has no location.
    pub distance_km: Option<f64>,
    pub age_difference: u32,
    pub shared_interests: Vec<String>,
    /// Fixed-priority human-readable highlights, at most [`MAX_HIGHLIGHTS`].
    pub highlights: Vec<String>,
}

impl QualityResult {
    /// Overall score as a rounded 0-100 percentage.
    pub fn percentage(&self) -> u32 {
        (self.overall * 100.0).round() as u32
    }
}

pub const MAX_HIGHLIGHTS: usize = 5;

const PACE_EQUAL: f64 = 1.0;
const PACE_ADJACENT: f64 = 0.6;
const PACE_DISTANT: f64 = 0.2;
const PACE_WILDCARD: f64 = 0.8;

/// Computes pairwise compatibility. Pure: no storage access, no clock, no
/// randomness; the same inputs always produce the same result.
///
/// The interest, lifestyle and pace dimensions are symmetric. Distance and
/// age read the seeker's configured limits, so they can differ between
/// perspectives when the two users configured different limits.
pub struct MatchQualityService {
    config: EngineConfig,
}

impl MatchQualityService {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn compute(&self, seeker: &User, candidate: &User) -> QualityResult {
        let distance_km = match (seeker.location, candidate.location) {
            (Some(a), Some(b)) => Some(haversine_km(a, b)),
            _ => None,
        };
        let age_difference = seeker.age.abs_diff(candidate.age);

        let dimensions = DimensionScores {
            distance: self.distance_score(distance_km, seeker.max_distance_km),
            age: self.age_score(age_difference),
            interest: interest_score(seeker, candidate),
            lifestyle: lifestyle_score(seeker, candidate),
            pace: pace_score(seeker.pace.as_ref(), candidate.pace.as_ref()),
        };

        let overall = (dimensions.distance * self.config.distance_weight
            + dimensions.age * self.config.age_weight
            + dimensions.interest * self.config.interest_weight
            + dimensions.lifestyle * self.config.lifestyle_weight
            + dimensions.pace * self.config.pace_weight)
            .clamp(0.0, 1.0);

        let shared_interests: Vec<String> = seeker
            .interests
            .intersection(&candidate.interests)
            .cloned()
            .collect();

        let highlights = self.highlights(
            seeker,
            candidate,
            distance_km,
            age_difference,
            &shared_interests,
            dimensions.pace,
        );

        QualityResult {
            overall,
            dimensions,
            distance_km,
            age_difference,
            shared_interests,
            highlights,
        }
    }

    /// Linear from 1.0 at 0 km to 0.0 at the seeker's distance limit.
    fn distance_score(&self, distance_km: Option<f64>, max_distance_km: f64) -> f64 {
        let Some(km) = distance_km else {
            return 0.5;
        };
        if max_distance_km <= 0.0 {
            return 0.5;
        }
        (1.0 - km / max_distance_km).clamp(0.0, 1.0)
    }

    /// Linear decay from 1.0 at equal age to 0.0 at the configured gap.
    fn age_score(&self, age_difference: u32) -> f64 {
        let max_gap = self.config.max_age_gap_years;
        if max_gap == 0 {
            return if age_difference == 0 { 1.0 } else { 0.0 };
        }
        (1.0 - f64::from(age_difference) / f64::from(max_gap)).clamp(0.0, 1.0)
    }

    /// Highlights come out in a fixed priority order so the same pair
    /// always renders the same list: proximity, similar age, shared
    /// interests, relationship goal, lifestyle overlaps, pace sync.
    fn highlights(
        &self,
        seeker: &User,
        candidate: &User,
        distance_km: Option<f64>,
        age_difference: u32,
        shared_interests: &[String],
        pace: f64,
    ) -> Vec<String> {
        let mut highlights = Vec::new();

        if let Some(km) = distance_km {
            if km < self.config.nearby_distance_km {
                highlights.push(format!("Lives nearby ({km:.1} km away)"));
            } else if km < self.config.close_distance_km {
                highlights.push(format!("{km:.0} km away"));
            }
        }

        if age_difference <= self.config.similar_age_years {
            highlights.push("Similar age".to_string());
        }

        match shared_interests.len() {
            0 => {}
            1 => highlights.push(format!("You both enjoy {}", shared_interests[0])),
            n => highlights.push(format!(
                "You share {n} interests: {}",
                format_interest_list(shared_interests)
            )),
        }

        if let (Some(mine), Some(theirs)) = (seeker.looking_for, candidate.looking_for) {
            if mine == theirs {
                highlights.push(format!("Both looking for {}", mine.display_name()));
            }
        }

        push_lifestyle_highlights(seeker, candidate, &mut highlights);

        if pace >= 0.95 {
            highlights.push("In sync on pace".to_string());
        } else if pace >= 0.8 {
            highlights.push("Great communication sync".to_string());
        }

        highlights.truncate(MAX_HIGHLIGHTS);
        highlights
    }
}

/// `|shared| / min(|A|, |B|)`; neutral when either set is empty.
fn interest_score(a: &User, b: &User) -> f64 {
    if a.interests.is_empty() || b.interests.is_empty() {
        return 0.5;
    }
    let shared = a.shared_interest_count(b);
    let min_size = a.interests.len().min(b.interests.len());
    shared as f64 / min_size as f64
}

/// Fraction of lifestyle fields both sides set that match exactly. Fields
/// either side left unset are out of both numerator and denominator.
fn lifestyle_score(a: &User, b: &User) -> f64 {
    let mut comparable = 0u32;
    let mut matched = 0u32;

    fn tally<T: PartialEq>(a: Option<T>, b: Option<T>, comparable: &mut u32, matched: &mut u32) {
        if let (Some(x), Some(y)) = (a, b) {
            *comparable += 1;
            if x == y {
                *matched += 1;
            }
        }
    }

    tally(a.smoking, b.smoking, &mut comparable, &mut matched);
    tally(a.drinking, b.drinking, &mut comparable, &mut matched);
    tally(a.kids_stance, b.kids_stance, &mut comparable, &mut matched);
    tally(a.looking_for, b.looking_for, &mut comparable, &mut matched);
    tally(a.education, b.education, &mut comparable, &mut matched);

    if comparable == 0 {
        return 0.5;
    }
    f64::from(matched) / f64::from(comparable)
}

/// Average of four ordinal-distance dimension scores; neutral when either
/// user never filled in pace preferences.
fn pace_score(a: Option<&PacePreferences>, b: Option<&PacePreferences>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.5;
    };

    let messaging = ordinal_score(
        a.messaging_frequency.ordinal(),
        b.messaging_frequency.ordinal(),
        false,
    );
    let first_date = ordinal_score(
        a.time_to_first_date.ordinal(),
        b.time_to_first_date.ordinal(),
        false,
    );
    let style = ordinal_score(
        a.communication_style.ordinal(),
        b.communication_style.ordinal(),
        a.communication_style.is_wildcard() || b.communication_style.is_wildcard(),
    );
    let depth = ordinal_score(
        a.depth_preference.ordinal(),
        b.depth_preference.ordinal(),
        a.depth_preference.is_wildcard() || b.depth_preference.is_wildcard(),
    );

    (messaging + first_date + style + depth) / 4.0
}

fn ordinal_score(a: u8, b: u8, wildcard: bool) -> f64 {
    if wildcard {
        return PACE_WILDCARD;
    }
    match a.abs_diff(b) {
        0 => PACE_EQUAL,
        1 => PACE_ADJACENT,
        _ => PACE_DISTANT,
    }
}

/// Up to three names, then "and N more".
fn format_interest_list(interests: &[String]) -> String {
    let shown: Vec<&str> = interests.iter().take(3).map(String::as_str).collect();
    let remaining = interests.len().saturating_sub(3);
    if remaining > 0 {
        format!("{}, and {remaining} more", shown.join(", "))
    } else {
        shown.join(", ")
    }
}

fn push_lifestyle_highlights(a: &User, b: &User, highlights: &mut Vec<String>) {
    use crate::models::{Drinking, Smoking};

    if let (Some(x), Some(y)) = (a.smoking, b.smoking) {
        if x == y && x == Smoking::Never {
            highlights.push("Both non-smokers".to_string());
        } else if x == y && x == Smoking::Sometimes {
            highlights.push("Both occasional smokers".to_string());
        }
    }
    if let (Some(x), Some(y)) = (a.drinking, b.drinking) {
        if x == y && x == Drinking::Never {
            highlights.push("Neither drinks".to_string());
        } else if x == y && x == Drinking::Socially {
            highlights.push("Both social drinkers".to_string());
        }
    }
    if let (Some(x), Some(y)) = (a.kids_stance, b.kids_stance) {
        if x == y {
            highlights.push("Same stance on kids".to_string());
        }
    }
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

// --- Profile enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Lifecycle state of an account. Only `Active` users participate in
/// matching, either as seeker or candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserState {
    Incomplete,
    Active,
    Paused,
    Banned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Smoking {
    Never,
    Sometimes,
    Regularly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Drinking {
    Never,
    Socially,
    Regularly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KidsStance {
    No,
    Open,
    Someday,
    HasKids,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LookingFor {
    Casual,
    ShortTerm,
    LongTerm,
    Marriage,
    Unsure,
}

impl LookingFor {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Casual => "something casual",
            Self::ShortTerm => "short-term dating",
            Self::LongTerm => "a long-term relationship",
            Self::Marriage => "marriage",
            Self::Unsure => "not sure yet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Education {
    HighSchool,
    SomeCollege,
    TradeSchool,
    Bachelors,
    Masters,
    Doctorate,
    Other,
}

// --- Pace preferences ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagingFrequency {
    Rarely,
    Often,
    Constantly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeToFirstDate {
    Quickly,
    FewDays,
    Weeks,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationStyle {
    TextOnly,
    VoiceNotes,
    VideoCalls,
    InPersonOnly,
    MixOfEverything,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthPreference {
    SmallTalk,
    DeepChat,
    Existential,
    DependsOnVibe,
}

impl MessagingFrequency {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Rarely => 0,
            Self::Often => 1,
            Self::Constantly => 2,
        }
    }
}

impl TimeToFirstDate {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Quickly => 0,
            Self::FewDays => 1,
            Self::Weeks => 2,
            Self::Months => 3,
        }
    }
}

impl CommunicationStyle {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::TextOnly => 0,
            Self::VoiceNotes => 1,
            Self::VideoCalls => 2,
            Self::InPersonOnly => 3,
            Self::MixOfEverything => 4,
        }
    }

    /// "Mix of everything" pairs well with any style.
    pub fn is_wildcard(self) -> bool {
        self == Self::MixOfEverything
    }
}

impl DepthPreference {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::SmallTalk => 0,
            Self::DeepChat => 1,
            Self::Existential => 2,
            Self::DependsOnVibe => 3,
        }
    }

    /// "Depends on the vibe" pairs well with any depth.
    pub fn is_wildcard(self) -> bool {
        self == Self::DependsOnVibe
    }
}

/// Communication/dating-speed preferences, used only for compatibility
/// scoring. All four dimensions are set together or the whole thing is
/// absent from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacePreferences {
    pub messaging_frequency: MessagingFrequency,
    pub time_to_first_date: TimeToFirstDate,
    pub communication_style: CommunicationStyle,
    pub depth_preference: DepthPreference,
}

// --- Dealbreakers ---

/// A user's hard filters. A candidate violating any restricted category is
/// removed from consideration entirely, never score-penalized. Empty set /
/// `None` means the category is unrestricted.
///
/// Dealbreakers are one-way: my dealbreakers filter who I see, not who
/// sees me.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dealbreakers {
    pub smoking: BTreeSet<Smoking>,
    pub drinking: BTreeSet<Drinking>,
    pub kids_stance: BTreeSet<KidsStance>,
    pub looking_for: BTreeSet<LookingFor>,
    pub education: BTreeSet<Education>,
    pub min_height_cm: Option<u16>,
    pub max_height_cm: Option<u16>,
    pub max_age_gap_years: Option<u32>,
}

impl Dealbreakers {
    /// Accepts everyone.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_any(&self) -> bool {
        !self.smoking.is_empty()
            || !self.drinking.is_empty()
            || !self.kids_stance.is_empty()
            || !self.looking_for.is_empty()
            || !self.education.is_empty()
            || self.min_height_cm.is_some()
            || self.max_height_cm.is_some()
            || self.max_age_gap_years.is_some()
    }

    /// True when the candidate satisfies every restricted category of the
    /// seeker. A candidate missing a value for a restricted lifestyle
    /// category fails it (encourages profile completion, the safer
    /// default), except height where a missing value passes.
    pub fn passes(&self, seeker: &User, candidate: &User) -> bool {
        self.failed_categories(seeker, candidate).is_empty()
    }

    /// Which restricted categories the candidate fails, for debug and
    /// moderation surfaces.
    pub fn failed_categories(&self, seeker: &User, candidate: &User) -> Vec<DealbreakerCategory> {
        let mut failed = Vec::new();
        if !member_or_unrestricted(&self.smoking, candidate.smoking) {
            failed.push(DealbreakerCategory::Smoking);
        }
        if !member_or_unrestricted(&self.drinking, candidate.drinking) {
            failed.push(DealbreakerCategory::Drinking);
        }
        if !member_or_unrestricted(&self.kids_stance, candidate.kids_stance) {
            failed.push(DealbreakerCategory::KidsStance);
        }
        if !member_or_unrestricted(&self.looking_for, candidate.looking_for) {
            failed.push(DealbreakerCategory::LookingFor);
        }
        if !member_or_unrestricted(&self.education, candidate.education) {
            failed.push(DealbreakerCategory::Education);
        }
        if !self.passes_height(candidate) {
            failed.push(DealbreakerCategory::Height);
        }
        if !self.passes_age_gap(seeker, candidate) {
            failed.push(DealbreakerCategory::AgeGap);
        }
        failed
    }

    fn passes_height(&self, candidate: &User) -> bool {
        let Some(height) = candidate.height_cm else {
            // Unknown height passes; height is the one category where we
            // give the candidate the benefit of the doubt.
            return true;
        };
        if self.min_height_cm.is_some_and(|min| height < min) {
            return false;
        }
        !self.max_height_cm.is_some_and(|max| height > max)
    }

    fn passes_age_gap(&self, seeker: &User, candidate: &User) -> bool {
        match self.max_age_gap_years {
            Some(max_gap) => seeker.age.abs_diff(candidate.age) <= max_gap,
            None => true,
        }
    }
}

fn member_or_unrestricted<T: Ord>(acceptable: &BTreeSet<T>, value: Option<T>) -> bool {
    if acceptable.is_empty() {
        return true;
    }
    match value {
        Some(v) => acceptable.contains(&v),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealbreakerCategory {
    Smoking,
    Drinking,
    KidsStance,
    LookingFor,
    Education,
    Height,
    AgeGap,
}

// --- User ---

/// Inclusive age bracket a user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && age <= self.max
    }
}

/// A user profile as the engine sees it. Owned and mutated by the profile
/// subsystem; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub interested_in: BTreeSet<Gender>,
    pub location: Option<GeoPoint>,
    pub max_distance_km: f64,
    /// `None` means the user never configured an age bracket.
    pub age_range: Option<AgeRange>,
    pub dealbreakers: Dealbreakers,
    pub smoking: Option<Smoking>,
    pub drinking: Option<Drinking>,
    pub kids_stance: Option<KidsStance>,
    pub looking_for: Option<LookingFor>,
    pub education: Option<Education>,
    pub height_cm: Option<u16>,
    pub interests: BTreeSet<String>,
    pub pace: Option<PacePreferences>,
    pub state: UserState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh profile with engine-relevant defaults. Starts `Incomplete`;
    /// the profile subsystem flips it to `Active` once onboarding is done.
    pub fn new(id: Uuid, name: impl Into<String>, age: u32, gender: Gender, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            bio: None,
            age,
            gender,
            interested_in: BTreeSet::new(),
            location: None,
            max_distance_km: 50.0,
            age_range: None,
            dealbreakers: Dealbreakers::none(),
            smoking: None,
            drinking: None,
            kids_stance: None,
            looking_for: None,
            education: None,
            height_cm: None,
            interests: BTreeSet::new(),
            pace: None,
            state: UserState::Incomplete,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == UserState::Active
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }

    /// Bidirectional gender compatibility: each side's interest set must
    /// contain the other's gender.
    pub fn mutually_interested(&self, other: &User) -> bool {
        self.interested_in.contains(&other.gender) && other.interested_in.contains(&self.gender)
    }

    pub fn shared_interest_count(&self, other: &User) -> usize {
        self.interests.intersection(&other.interests).count()
    }
}

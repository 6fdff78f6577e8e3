use serde::Deserialize;

/// Engine configuration. Every tunable lives here so embedders can override
/// individual values through the environment (prefix `EMBERLINK`, `__` as
/// separator) without recompiling.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    // -- Quality score weights (default sums to 1.0) --
    #[serde(default = "default_distance_weight")]
    pub distance_weight: f64,
    #[serde(default = "default_age_weight")]
    pub age_weight: f64,
    #[serde(default = "default_interest_weight")]
    pub interest_weight: f64,
    #[serde(default = "default_lifestyle_weight")]
    pub lifestyle_weight: f64,
    #[serde(default = "default_pace_weight")]
    pub pace_weight: f64,

    /// Age difference (years) at which the age score bottoms out at 0.0.
    #[serde(default = "default_max_age_gap_years")]
    pub max_age_gap_years: u32,

    // -- Daily engagement limits --
    #[serde(default = "default_daily_like_limit")]
    pub daily_like_limit: u32,
    #[serde(default = "default_daily_pass_limit")]
    pub daily_pass_limit: u32,
    #[serde(default)]
    pub unlimited_likes: bool,
    #[serde(default)]
    pub unlimited_passes: bool,

    // -- Highlight / reason thresholds --
    #[serde(default = "default_nearby_distance_km")]
    pub nearby_distance_km: f64,
    #[serde(default = "default_close_distance_km")]
    pub close_distance_km: f64,
    #[serde(default = "default_similar_age_years")]
    pub similar_age_years: u32,
    #[serde(default = "default_compatible_age_years")]
    pub compatible_age_years: u32,
    #[serde(default = "default_min_shared_interests")]
    pub min_shared_interests: usize,

    // -- Standouts --
    #[serde(default = "default_max_standouts")]
    pub max_standouts: usize,
    #[serde(default = "default_standout_diversity_days")]
    pub standout_diversity_days: u32,
}

fn default_distance_weight() -> f64 { 0.15 }
fn default_age_weight() -> f64 { 0.10 }
fn default_interest_weight() -> f64 { 0.30 }
fn default_lifestyle_weight() -> f64 { 0.30 }
fn default_pace_weight() -> f64 { 0.15 }
fn default_max_age_gap_years() -> u32 { 20 }
fn default_daily_like_limit() -> u32 { 100 }
fn default_daily_pass_limit() -> u32 { 500 }
fn default_nearby_distance_km() -> f64 { 5.0 }
fn default_close_distance_km() -> f64 { 15.0 }
fn default_similar_age_years() -> u32 { 2 }
fn default_compatible_age_years() -> u32 { 5 }
fn default_min_shared_interests() -> usize { 3 }
fn default_max_standouts() -> usize { 10 }
fn default_standout_diversity_days() -> u32 { 3 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distance_weight: default_distance_weight(),
            age_weight: default_age_weight(),
            interest_weight: default_interest_weight(),
            lifestyle_weight: default_lifestyle_weight(),
            pace_weight: default_pace_weight(),
            max_age_gap_years: default_max_age_gap_years(),
            daily_like_limit: default_daily_like_limit(),
            daily_pass_limit: default_daily_pass_limit(),
            unlimited_likes: false,
            unlimited_passes: false,
            nearby_distance_km: default_nearby_distance_km(),
            close_distance_km: default_close_distance_km(),
            similar_age_years: default_similar_age_years(),
            compatible_age_years: default_compatible_age_years(),
            min_shared_interests: default_min_shared_interests(),
            max_standouts: default_max_standouts(),
            standout_diversity_days: default_standout_diversity_days(),
        }
    }
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("EMBERLINK").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Sum of the five quality weights. The overall score is clamped to
    /// [0, 1] regardless, but embedders overriding weights usually want
    /// this to stay at 1.0.
    pub fn weight_total(&self) -> f64 {
        self.distance_weight
            + self.age_weight
            + self.interest_weight
            + self.lifestyle_weight
            + self.pace_weight
    }
}

//! Simulation configuration and named tuning profiles.
//!
//! Every tunable lives in an explicit `SimConfig` handed to the engine at
//! construction, so independent sessions can run side by side with
//! different tunings. Two profiles ship with the engine:
//!
//! | Profile | Player boost | Opponent targets | Safety margin | Launch fraction |
//! |---------|--------------|------------------|---------------|-----------------|
//! | [`Profile::Extended`] | 1.5x production, boost skill, combos | neutral first | 2.0 | 0.5 |
//! | [`Profile::Classic`] | none | player first | 1.5 | 0.6 |

use serde::{Deserialize, Serialize};

/// Named configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Profile {
    /// Symmetric production, no boost or combo, aggressive opponent
    Classic,
    /// Player-favoring production with the boost skill and combo scoring
    Extended,
}

impl Profile {
    pub fn config(&self) -> SimConfig {
        match self {
            Profile::Classic => SimConfig::classic(),
            Profile::Extended => SimConfig::extended(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profile::Classic => "classic",
            Profile::Extended => "extended",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Some(Profile::Classic),
            "extended" => Some(Profile::Extended),
            _ => None,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub planets: PlanetConfig,
    pub fleets: FleetConfig,
    pub boost: BoostConfig,
    pub combo: ComboConfig,
    pub opponent: OpponentProfile,
    /// Frame deltas at or above this many seconds are discarded
    pub max_tick_delta: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::extended()
    }
}

impl SimConfig {
    pub fn extended() -> Self {
        Self {
            arena: ArenaConfig::default(),
            planets: PlanetConfig::default(),
            fleets: FleetConfig::default(),
            boost: BoostConfig::default(),
            combo: ComboConfig::default(),
            opponent: OpponentProfile::neutral_first(),
            max_tick_delta: 1.0,
        }
    }

    pub fn classic() -> Self {
        Self {
            arena: ArenaConfig::default(),
            planets: PlanetConfig {
                player_multiplier: 1.0,
                player_start_planets: 1,
                player_start_units: 50.0,
                enemy_start_units: 50.0,
                ..PlanetConfig::default()
            },
            fleets: FleetConfig::default(),
            boost: BoostConfig {
                enabled: false,
                ..BoostConfig::default()
            },
            combo: ComboConfig {
                enabled: false,
                ..ComboConfig::default()
            },
            opponent: OpponentProfile::player_first(),
            max_tick_delta: 1.0,
        }
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tunings the engine cannot run with. Every check is written so
    /// that NaN fails it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.arena;
        if !(a.width > 2.0 * a.margin && a.height > 2.0 * a.margin) || !non_negative(a.margin) {
            return Err(ConfigError::invalid("arena.margin", "margin leaves no room for planets"));
        }
        if !a.width.is_finite() || !a.height.is_finite() {
            return Err(ConfigError::invalid("arena.width", "must be finite"));
        }
        if !(a.min_radius > 0.0 && a.max_radius >= a.min_radius && a.max_radius.is_finite()) {
            return Err(ConfigError::invalid("arena.min_radius", "radius range must be positive and ordered"));
        }
        if !(a.spacing >= 0.0 && a.spacing.is_finite()) {
            return Err(ConfigError::invalid("arena.spacing", "must not be negative"));
        }

        let p = &self.planets;
        if !(non_negative(p.base_rate) && positive(p.player_multiplier)) {
            return Err(ConfigError::invalid("planets.base_rate", "production rates must not be negative"));
        }
        if !positive(p.radius_per_rate) {
            return Err(ConfigError::invalid("planets.radius_per_rate", "must be positive"));
        }
        if !(non_negative(p.player_start_units) && non_negative(p.enemy_start_units)) {
            return Err(ConfigError::invalid("planets.player_start_units", "must not be negative"));
        }
        if p.neutral_units_max < p.neutral_units_min {
            return Err(ConfigError::invalid("planets.neutral_units_max", "range is inverted"));
        }

        let f = &self.fleets;
        if !positive(f.speed) {
            return Err(ConfigError::invalid("fleets.speed", "must be positive"));
        }
        if !positive(f.arrival_threshold) {
            return Err(ConfigError::invalid("fleets.arrival_threshold", "must be positive"));
        }
        if !in_unit_interval(f.send_ratio) || !in_unit_interval(f.send_all_ratio) {
            return Err(ConfigError::invalid("fleets.send_ratio", "must be in (0, 1]"));
        }

        let b = &self.boost;
        if !(non_negative(b.cooldown_secs) && non_negative(b.duration_secs) && positive(b.multiplier)) {
            return Err(ConfigError::invalid("boost", "timers must not be negative and multiplier must be positive"));
        }
        if !non_negative(self.combo.window_secs) {
            return Err(ConfigError::invalid("combo.window_secs", "must not be negative"));
        }

        let o = &self.opponent;
        if !(0.0..=1.0).contains(&o.act_probability) {
            return Err(ConfigError::invalid("opponent.act_probability", "must be in [0, 1]"));
        }
        if !in_unit_interval(o.dispatch_fraction) {
            return Err(ConfigError::invalid("opponent.dispatch_fraction", "must be in (0, 1]"));
        }
        if !non_negative(o.safety_margin) {
            return Err(ConfigError::invalid("opponent.safety_margin", "must not be negative"));
        }
        if !non_negative(o.min_source_units) {
            return Err(ConfigError::invalid("opponent.min_source_units", "must not be negative"));
        }

        if !positive(self.max_tick_delta) {
            return Err(ConfigError::invalid("max_tick_delta", "must be positive"));
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value > 0.0 && value.is_finite()
}

fn non_negative(value: f32) -> bool {
    value >= 0.0 && value.is_finite()
}

fn in_unit_interval(value: f32) -> bool {
    value > 0.0 && value <= 1.0
}

/// Arena bounds and planet placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Planet centers stay this far from the edges
    pub margin: f32,
    pub planet_count: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Extra gap required between planet rims
    pub spacing: f32,
    /// Candidate positions tried per planet before giving up on it
    pub placement_attempts: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 80.0,
            planet_count: 12,
            min_radius: 20.0,
            max_radius: 40.0,
            spacing: 50.0,
            placement_attempts: 100,
        }
    }
}

/// Planet production and starting garrisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    /// Ships per second per unit of production rate
    pub base_rate: f32,
    /// Production rate = radius / radius_per_rate
    pub radius_per_rate: f32,
    /// Production multiplier for player planets (enemy is always 1)
    pub player_multiplier: f32,
    pub player_start_planets: u32,
    pub player_start_units: f32,
    pub enemy_start_planets: u32,
    pub enemy_start_units: f32,
    /// Inclusive integer range for neutral garrisons
    pub neutral_units_min: u32,
    pub neutral_units_max: u32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.5,
            radius_per_rate: 15.0,
            player_multiplier: 1.5,
            player_start_planets: 2,
            player_start_units: 100.0,
            enemy_start_planets: 1,
            enemy_start_units: 30.0,
            neutral_units_min: 10,
            neutral_units_max: 29,
        }
    }
}

impl PlanetConfig {
    pub fn production_rate_for(&self, radius: f32) -> f32 {
        radius / self.radius_per_rate
    }
}

/// Fleet flight and launch ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Distance units per second
    pub speed: f32,
    /// A fleet closer than this to its target's center has arrived
    pub arrival_threshold: f32,
    /// Share of a planet's garrison sent per order
    pub send_ratio: f32,
    /// Share sent while send-all mode is toggled on
    pub send_all_ratio: f32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            speed: 100.0,
            arrival_threshold: 5.0,
            send_ratio: 0.5,
            send_all_ratio: 0.9,
        }
    }
}

/// Player production boost skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub enabled: bool,
    pub cooldown_secs: f32,
    pub duration_secs: f32,
    pub multiplier: f32,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_secs: 30.0,
            duration_secs: 5.0,
            multiplier: 3.0,
        }
    }
}

/// Conquest streak scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub enabled: bool,
    /// Wall-clock seconds allowed between conquests before the streak resets
    pub window_secs: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 5.0,
        }
    }
}

/// Which planets the opponent looks at first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPreference {
    /// Neutral planets while any remain, then the player's
    NeutralFirst,
    /// The player's planets while any remain, then neutral ones
    PlayerFirst,
}

/// Scripted opponent tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentProfile {
    /// Chance per tick that the opponent considers an attack
    pub act_probability: f64,
    /// Source planets need strictly more units than this
    pub min_source_units: f32,
    pub target_preference: TargetPreference,
    /// Source must hold more than `target * safety_margin`
    pub safety_margin: f32,
    /// Share of the source garrison sent per attack
    pub dispatch_fraction: f32,
}

impl Default for OpponentProfile {
    fn default() -> Self {
        Self::neutral_first()
    }
}

impl OpponentProfile {
    pub fn neutral_first() -> Self {
        Self {
            act_probability: 0.01,
            min_source_units: 30.0,
            target_preference: TargetPreference::NeutralFirst,
            safety_margin: 2.0,
            dispatch_fraction: 0.5,
        }
    }

    pub fn player_first() -> Self {
        Self {
            act_probability: 0.02,
            min_source_units: 20.0,
            target_preference: TargetPreference::PlayerFirst,
            safety_margin: 1.5,
            dispatch_fraction: 0.6,
        }
    }
}

/// Errors from loading or validating a configuration
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

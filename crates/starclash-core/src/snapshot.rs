//! Read-only views handed to the presentation layer each frame

use serde::{Deserialize, Serialize};

use crate::components::{Faction, FleetId, PlanetId, Vec2};
use crate::systems::BoostState;

/// One planet as drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetView {
    pub id: PlanetId,
    pub position: Vec2,
    pub radius: f32,
    pub owner: Faction,
    pub units: u32,
    pub production_rate: f32,
}

/// One fleet in flight as drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetView {
    pub id: FleetId,
    pub position: Vec2,
    pub ships: u32,
    pub owner: Faction,
    /// Unit heading
    pub direction: Vec2,
    pub target: PlanetId,
}

/// Whether the match is still being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Running,
    Won,
    Lost,
}

impl SessionState {
    pub fn is_ended(&self) -> bool {
        !matches!(self, SessionState::Running)
    }

    pub fn is_won(&self) -> bool {
        matches!(self, SessionState::Won)
    }
}

/// Per-faction tallies for the HUD
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub player_planets: u32,
    pub player_units: u32,
    pub enemy_planets: u32,
    pub enemy_units: u32,
    pub neutral_planets: u32,
    pub total_planets: u32,
    /// Share of all planets held by the player, 0..=1
    pub progress: f32,
}

/// End-of-match grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    /// Won inside a minute
    Lightning,
    /// Won inside two minutes
    Swift,
    /// Won while holding a streak of five or more
    ComboMaster,
    Solid,
    Defeat,
}

impl Rating {
    pub fn grade(won: bool, play_time_secs: f32, combo: u32) -> Self {
        if !won {
            Rating::Defeat
        } else if play_time_secs < 60.0 {
            Rating::Lightning
        } else if play_time_secs < 120.0 {
            Rating::Swift
        } else if combo >= 5 {
            Rating::ComboMaster
        } else {
            Rating::Solid
        }
    }
}

/// Stats shown once the match is over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub won: bool,
    /// Wall-clock seconds from start (or restart) to the end
    pub play_time_secs: f32,
    pub combo: u32,
    pub conquered: u32,
    pub rating: Rating,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub sim_time: f64,
    pub planets: Vec<PlanetView>,
    pub fleets: Vec<FleetView>,
    pub selected: Option<PlanetId>,
    pub send_all: bool,
    pub session: SessionState,
    pub boost: BoostState,
    pub combo: u32,
    pub conquered: u32,
    pub scoreboard: Scoreboard,
}

//! Planet component - a fixed production site that changes hands through combat

use super::common::{Faction, Vec2};
use crate::config::PlanetConfig;
use serde::{Deserialize, Serialize};

/// A planet in the arena.
///
/// Position and radius are fixed at creation. Owner and unit count only
/// change through production and combat resolution, both of which live
/// in `systems`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Planet {
    position: Vec2,
    radius: f32,
    pub(crate) owner: Faction,
    /// Fractional internally, floored for display
    pub(crate) units: f32,
    production_rate: f32,
}

impl Planet {
    pub fn new(position: Vec2, radius: f32, owner: Faction, units: f32, production_rate: f32) -> Self {
        Self {
            position,
            radius,
            owner,
            units: units.max(0.0),
            production_rate,
        }
    }

    /// Build a planet whose production rate is derived from its radius
    pub fn with_radius_rate(
        position: Vec2,
        radius: f32,
        owner: Faction,
        units: f32,
        config: &PlanetConfig,
    ) -> Self {
        Self::new(position, radius, owner, units, config.production_rate_for(radius))
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn owner(&self) -> Faction {
        self.owner
    }

    pub fn units(&self) -> f32 {
        self.units
    }

    /// Unit count as shown to the player
    pub fn display_units(&self) -> u32 {
        self.units.floor() as u32
    }

    pub fn production_rate(&self) -> f32 {
        self.production_rate
    }

    pub fn is_owned_by(&self, faction: Faction) -> bool {
        self.owner == faction
    }

    /// Grow the garrison by `base_rate * production_rate * dt * owner_multiplier * boost`.
    ///
    /// The owner multiplier is 1 for the opponent and `player_multiplier`
    /// for the player. Neutral planets never produce.
    pub fn produce_ships(&mut self, delta_seconds: f32, config: &PlanetConfig, boost_multiplier: f32) {
        let owner_multiplier = match self.owner {
            Faction::Neutral => return,
            Faction::Player => config.player_multiplier,
            Faction::Enemy => 1.0,
        };
        let produced = config.base_rate
            * self.production_rate
            * delta_seconds
            * owner_multiplier
            * boost_multiplier;
        if produced > 0.0 {
            self.units += produced;
        }
    }

    /// Hit test against the planet disc (boundary inclusive)
    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        self.position.distance_squared(&Vec2::new(px, py)) <= self.radius * self.radius
    }

    /// Remove exactly `amount` whole units for a launch
    pub(crate) fn withdraw(&mut self, amount: u32) {
        self.units = (self.units - amount as f32).max(0.0);
    }
}

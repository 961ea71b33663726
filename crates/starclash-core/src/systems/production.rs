//! Production system - grows garrisons on owned planets

use crate::components::{Faction, Planet};
use crate::config::PlanetConfig;

/// Advance production on every planet.
///
/// `player_boost` multiplies player production only; the opponent always
/// produces at its base rate.
pub fn production_system(planets: &mut [Planet], config: &PlanetConfig, player_boost: f32, delta_seconds: f32) {
    for planet in planets.iter_mut() {
        let boost = if planet.owner() == Faction::Player { player_boost } else { 1.0 };
        planet.produce_ships(delta_seconds, config, boost);
    }
}

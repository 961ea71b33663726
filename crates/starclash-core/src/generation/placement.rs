//! Planet placement - scatters non-overlapping planets across the arena

use rand::Rng;

use crate::components::{Faction, Planet, Vec2};
use crate::config::{ArenaConfig, PlanetConfig};

/// Place up to `arena.planet_count` planets.
///
/// Each slot samples a center inside the margin and a radius, and retries
/// while the candidate crowds an already placed planet (closer than the
/// two radii plus `arena.spacing`). A slot that runs out of attempts is
/// skipped, so fewer planets than configured may come back.
///
/// Owners are assigned in placement order: the first
/// `player_start_planets` go to the player, the next
/// `enemy_start_planets` to the enemy, the rest stay neutral.
pub fn generate_planets(arena: &ArenaConfig, config: &PlanetConfig, rng: &mut impl Rng) -> Vec<Planet> {
    let mut planets: Vec<Planet> = Vec::with_capacity(arena.planet_count as usize);

    for slot in 0..arena.planet_count {
        let Some((position, radius)) = find_site(&planets, arena, rng) else {
            log::debug!("Planet slot {} skipped after {} attempts", slot, arena.placement_attempts);
            continue;
        };

        let owner = owner_for_index(planets.len() as u32, config);
        let units = starting_units(owner, config, rng);
        planets.push(Planet::with_radius_rate(position, radius, owner, units, config));
    }

    if planets.len() < arena.planet_count as usize {
        log::warn!(
            "Placed {} of {} planets; arena too crowded",
            planets.len(),
            arena.planet_count
        );
    }

    planets
}

/// Sample candidate sites until one fits or attempts run out
fn find_site(placed: &[Planet], arena: &ArenaConfig, rng: &mut impl Rng) -> Option<(Vec2, f32)> {
    for _ in 0..arena.placement_attempts {
        let x = sample(rng, arena.margin, arena.width - arena.margin);
        let y = sample(rng, arena.margin, arena.height - arena.margin);
        let radius = sample(rng, arena.min_radius, arena.max_radius);
        let candidate = Vec2::new(x, y);

        let crowded = placed.iter().any(|planet| {
            planet.position().distance(&candidate) < planet.radius() + radius + arena.spacing
        });
        if !crowded {
            return Some((candidate, radius));
        }
    }
    None
}

/// Uniform in `[lo, hi)`, or `lo` for an empty range
fn sample(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn owner_for_index(index: u32, config: &PlanetConfig) -> Faction {
    if index < config.player_start_planets {
        Faction::Player
    } else if index < config.player_start_planets + config.enemy_start_planets {
        Faction::Enemy
    } else {
        Faction::Neutral
    }
}

/// Starting garrison for a planet of the given owner
pub fn starting_units(owner: Faction, config: &PlanetConfig, rng: &mut impl Rng) -> f32 {
    match owner {
        Faction::Player => config.player_start_units,
        Faction::Enemy => config.enemy_start_units,
        Faction::Neutral if config.neutral_units_max > config.neutral_units_min => {
            rng.gen_range(config.neutral_units_min..=config.neutral_units_max) as f32
        }
        Faction::Neutral => config.neutral_units_min as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_arena_places_planets() {
        let mut rng = StdRng::seed_from_u64(42);
        let arena = ArenaConfig::default();
        let config = PlanetConfig::default();
        let planets = generate_planets(&arena, &config, &mut rng);

        assert!(planets.len() >= 3);
        assert!(planets.len() <= arena.planet_count as usize);
        assert_eq!(planets[0].owner(), Faction::Player);
        assert_eq!(planets[1].owner(), Faction::Player);
        assert_eq!(planets[2].owner(), Faction::Enemy);
        assert!(planets[3..].iter().all(|p| p.owner() == Faction::Neutral));
    }

    #[test]
    fn test_planets_respect_spacing_and_margin() {
        let mut rng = StdRng::seed_from_u64(9);
        let arena = ArenaConfig::default();
        let planets = generate_planets(&arena, &PlanetConfig::default(), &mut rng);

        for (i, a) in planets.iter().enumerate() {
            let p = a.position();
            assert!(p.x >= arena.margin && p.x <= arena.width - arena.margin);
            assert!(p.y >= arena.margin && p.y <= arena.height - arena.margin);
            assert!(a.radius() >= arena.min_radius && a.radius() <= arena.max_radius);
            for b in &planets[i + 1..] {
                let gap = a.position().distance(&b.position());
                assert!(gap >= a.radius() + b.radius() + arena.spacing);
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let arena = ArenaConfig::default();
        let config = PlanetConfig::default();
        let a = generate_planets(&arena, &config, &mut StdRng::seed_from_u64(5));
        let b = generate_planets(&arena, &config, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_starting_garrisons() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = PlanetConfig::default();
        assert_eq!(starting_units(Faction::Player, &config, &mut rng), 100.0);
        assert_eq!(starting_units(Faction::Enemy, &config, &mut rng), 30.0);
        for _ in 0..200 {
            let n = starting_units(Faction::Neutral, &config, &mut rng);
            assert!((10.0..=29.0).contains(&n));
            assert_eq!(n.fract(), 0.0);
        }
    }

    #[test]
    fn test_inverted_neutral_range_uses_minimum() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = PlanetConfig {
            neutral_units_min: 30,
            neutral_units_max: 10,
            ..PlanetConfig::default()
        };
        assert_eq!(starting_units(Faction::Neutral, &config, &mut rng), 30.0);
    }

    #[test]
    fn test_crowded_arena_skips_slots() {
        let arena = ArenaConfig {
            width: 250.0,
            height: 250.0,
            margin: 100.0,
            planet_count: 10,
            placement_attempts: 20,
            ..ArenaConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let planets = generate_planets(&arena, &PlanetConfig::default(), &mut rng);
        // 50x50 box cannot hold two planets 90+ apart
        assert_eq!(planets.len(), 1);
        assert_eq!(planets[0].owner(), Faction::Player);
    }
}

//! Opponent policy - the scripted enemy commander.
//!
//! Stateless: every decision is derived from the planets as they stand
//! this tick. On a small per-tick chance it picks a random well-stocked
//! planet and attacks the candidate with the best
//! `(source - target) / distance` score that it outnumbers by the
//! profile's safety margin.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Faction, Planet, PlanetId};
use crate::config::{OpponentProfile, TargetPreference};

/// An attack the opponent decided on this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentOrder {
    pub source: PlanetId,
    pub target: PlanetId,
    /// Fraction of the source garrison to send
    pub fraction: f32,
}

/// Run the policy for one tick
pub fn plan_opponent_order(
    planets: &[Planet],
    profile: &OpponentProfile,
    rng: &mut impl Rng,
) -> Option<OpponentOrder> {
    let p = profile.act_probability;
    if p.is_nan() || p <= 0.0 || !rng.gen_bool(p.min(1.0)) {
        return None;
    }

    let sources: Vec<PlanetId> = planets
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_owned_by(Faction::Enemy) && p.units() > profile.min_source_units)
        .map(|(idx, _)| PlanetId(idx))
        .collect();
    let source = *sources.choose(rng)?;

    let target = best_target(planets, source, profile)?;
    Some(OpponentOrder {
        source,
        target,
        fraction: profile.dispatch_fraction,
    })
}

/// Planets the opponent will consider attacking, per its preference
pub fn target_candidates(planets: &[Planet], preference: TargetPreference) -> Vec<PlanetId> {
    let (first, second) = match preference {
        TargetPreference::NeutralFirst => (Faction::Neutral, Faction::Player),
        TargetPreference::PlayerFirst => (Faction::Player, Faction::Neutral),
    };

    let owned_by = |faction: Faction| -> Vec<PlanetId> {
        planets
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_owned_by(faction))
            .map(|(idx, _)| PlanetId(idx))
            .collect()
    };

    let preferred = owned_by(first);
    if preferred.is_empty() {
        owned_by(second)
    } else {
        preferred
    }
}

/// Highest-scoring candidate the source outnumbers by the safety margin.
///
/// Ties keep the earliest candidate. Candidates at zero distance are
/// skipped since a fleet could not be launched at them.
pub fn best_target(planets: &[Planet], source: PlanetId, profile: &OpponentProfile) -> Option<PlanetId> {
    let src = planets.get(source.index())?;
    let mut best: Option<(PlanetId, f32)> = None;

    for candidate in target_candidates(planets, profile.target_preference) {
        if candidate == source {
            continue;
        }
        let target = &planets[candidate.index()];
        let distance = src.position().distance(&target.position());
        if distance <= f32::EPSILON {
            continue;
        }
        if src.units() <= target.units() * profile.safety_margin {
            continue;
        }

        let score = (src.units() - target.units()) / distance;
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn planet(x: f32, owner: Faction, units: f32) -> Planet {
        Planet::new(Vec2::new(x, 0.0), 20.0, owner, units, 1.0)
    }

    fn always_acts(profile: OpponentProfile) -> OpponentProfile {
        OpponentProfile {
            act_probability: 1.0,
            ..profile
        }
    }

    #[test]
    fn test_neutral_first_prefers_neutral() {
        let planets = vec![
            planet(0.0, Faction::Enemy, 100.0),
            planet(100.0, Faction::Player, 1.0),
            planet(400.0, Faction::Neutral, 20.0),
        ];
        let profile = OpponentProfile::neutral_first();
        assert_eq!(best_target(&planets, PlanetId(0), &profile), Some(PlanetId(2)));
    }

    #[test]
    fn test_player_first_prefers_player() {
        let planets = vec![
            planet(0.0, Faction::Enemy, 100.0),
            planet(400.0, Faction::Player, 40.0),
            planet(100.0, Faction::Neutral, 1.0),
        ];
        let profile = OpponentProfile::player_first();
        assert_eq!(best_target(&planets, PlanetId(0), &profile), Some(PlanetId(1)));
    }

    #[test]
    fn test_falls_back_when_preferred_set_empty() {
        let planets = vec![planet(0.0, Faction::Enemy, 100.0), planet(200.0, Faction::Player, 10.0)];
        let profile = OpponentProfile::neutral_first();
        assert_eq!(target_candidates(&planets, profile.target_preference), vec![PlanetId(1)]);
        assert_eq!(best_target(&planets, PlanetId(0), &profile), Some(PlanetId(1)));
    }

    #[test]
    fn test_safety_margin_gate() {
        let planets = vec![planet(0.0, Faction::Enemy, 60.0), planet(100.0, Faction::Neutral, 30.0)];
        // 60 is not more than 30 * 2.0
        assert_eq!(best_target(&planets, PlanetId(0), &OpponentProfile::neutral_first()), None);
        // but is more than 30 * 1.5
        let lenient = OpponentProfile {
            target_preference: TargetPreference::NeutralFirst,
            ..OpponentProfile::player_first()
        };
        assert_eq!(best_target(&planets, PlanetId(0), &lenient), Some(PlanetId(1)));
    }

    #[test]
    fn test_score_prefers_close_weak_targets() {
        let planets = vec![
            planet(0.0, Faction::Enemy, 100.0),
            planet(500.0, Faction::Neutral, 10.0),
            planet(100.0, Faction::Neutral, 20.0),
        ];
        // (100-10)/500 = 0.18 vs (100-20)/100 = 0.8
        assert_eq!(best_target(&planets, PlanetId(0), &OpponentProfile::neutral_first()), Some(PlanetId(2)));
    }

    #[test]
    fn test_never_acts_at_zero_probability() {
        let planets = vec![planet(0.0, Faction::Enemy, 100.0), planet(100.0, Faction::Neutral, 1.0)];
        let profile = OpponentProfile {
            act_probability: 0.0,
            ..OpponentProfile::neutral_first()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(plan_opponent_order(&planets, &profile, &mut rng).is_none());
        }
    }

    #[test]
    fn test_nan_probability_never_acts() {
        let planets = vec![planet(0.0, Faction::Enemy, 100.0), planet(100.0, Faction::Neutral, 1.0)];
        let profile = OpponentProfile {
            act_probability: f64::NAN,
            ..OpponentProfile::neutral_first()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(plan_opponent_order(&planets, &profile, &mut rng).is_none());
    }

    #[test]
    fn test_order_uses_profile_fraction() {
        let planets = vec![planet(0.0, Faction::Enemy, 100.0), planet(100.0, Faction::Neutral, 10.0)];
        let profile = always_acts(OpponentProfile::player_first());
        let mut rng = StdRng::seed_from_u64(7);
        let order = plan_opponent_order(&planets, &profile, &mut rng).unwrap();
        assert_eq!(order.source, PlanetId(0));
        assert_eq!(order.target, PlanetId(1));
        assert_eq!(order.fraction, 0.6);
    }

    #[test]
    fn test_weak_sources_do_nothing() {
        let planets = vec![planet(0.0, Faction::Enemy, 30.0), planet(100.0, Faction::Neutral, 1.0)];
        let profile = always_acts(OpponentProfile::neutral_first());
        let mut rng = StdRng::seed_from_u64(3);
        // 30 is not strictly above the 30-unit minimum
        assert!(plan_opponent_order(&planets, &profile, &mut rng).is_none());
    }
}

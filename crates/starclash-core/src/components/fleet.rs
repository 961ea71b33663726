//! Fleet components - ship groups in flight between planets.
//!
//! A fleet is an ECS entity carrying `Fleet`, `Position` and `Velocity`.
//! It refers to its target by `PlanetId` so it never owns the planet.

use super::common::{Faction, PlanetId, Vec2};
use serde::{Deserialize, Serialize};

/// Launch-ordered fleet identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FleetId(pub u64);

/// Cargo and allegiance of a fleet in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    /// Captured at launch, never changes
    pub owner: Faction,
    pub ships: f32,
    pub target: PlanetId,
}

/// Current location of a fleet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// Constant velocity, computed once at launch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

impl Velocity {
    /// Velocity of magnitude `speed` pointing from `from` toward `to`.
    ///
    /// Returns `None` when the two points coincide, since there is no
    /// direction to fly in.
    pub fn toward(from: Vec2, to: Vec2, speed: f32) -> Option<Self> {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON || !distance.is_finite() {
            return None;
        }
        Some(Self(Vec2::new(delta.x / distance * speed, delta.y / distance * speed)))
    }

    /// Unit heading, used for drawing
    pub fn direction(&self) -> Vec2 {
        self.0.normalize()
    }
}

impl Fleet {
    /// Build the component bundle for a new fleet, or `None` for a
    /// zero-distance launch.
    pub fn launch(
        id: FleetId,
        owner: Faction,
        ships: f32,
        from: Vec2,
        target: PlanetId,
        target_position: Vec2,
        speed: f32,
    ) -> Option<(Fleet, Position, Velocity)> {
        let velocity = Velocity::toward(from, target_position, speed)?;
        let fleet = Fleet {
            id,
            owner,
            ships: ships.max(0.0),
            target,
        };
        Some((fleet, Position(from), velocity))
    }

    /// Ship count as shown to the player
    pub fn display_ships(&self) -> u32 {
        self.ships.floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_has_configured_speed() {
        let v = Velocity::toward(Vec2::new(0.0, 0.0), Vec2::new(30.0, 40.0), 100.0).unwrap();
        assert!((v.0.length() - 100.0).abs() < 1e-3);
        assert!((v.0.x - 60.0).abs() < 1e-3);
        assert!((v.0.y - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_distance_launch_rejected() {
        let p = Vec2::new(50.0, 50.0);
        assert!(Velocity::toward(p, p, 100.0).is_none());
        assert!(Fleet::launch(FleetId(0), Faction::Player, 5.0, p, PlanetId(1), p, 100.0).is_none());
    }

    #[test]
    fn test_launch_starts_at_source() {
        let (fleet, pos, _) = Fleet::launch(
            FleetId(3),
            Faction::Enemy,
            12.0,
            Vec2::new(10.0, 10.0),
            PlanetId(2),
            Vec2::new(110.0, 10.0),
            100.0,
        )
        .unwrap();
        assert_eq!(fleet.owner, Faction::Enemy);
        assert_eq!(fleet.display_ships(), 12);
        assert_eq!(pos.0, Vec2::new(10.0, 10.0));
    }
}

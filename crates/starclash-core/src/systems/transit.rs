//! Transit system - flies fleets toward their targets and resolves arrivals

use hecs::{Entity, World};

use super::combat::{resolve_arrival, ArrivalOutcome};
use crate::components::{Fleet, Planet, Position, Vec2, Velocity};

/// A fleet that reached its target this tick, after resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub fleet: Fleet,
    pub outcome: ArrivalOutcome,
}

/// Move every fleet and resolve the ones that arrived.
///
/// Arrivals are applied in launch order so that several fleets landing
/// on one planet in the same tick always resolve the same way. Resolved
/// fleets are despawned.
pub fn transit_system(
    world: &mut World,
    planets: &mut [Planet],
    arrival_threshold: f32,
    delta_seconds: f32,
) -> Vec<Arrival> {
    let mut arrived: Vec<(Entity, Fleet)> = Vec::new();

    for (entity, (fleet, pos, vel)) in world.query_mut::<(&Fleet, &mut Position, &Velocity)>() {
        let Some(target) = planets.get(fleet.target.index()) else {
            // Stale handle; nothing to land on
            arrived.push((entity, *fleet));
            continue;
        };
        let destination = target.position();
        if advance(pos, vel, destination, arrival_threshold, delta_seconds) {
            arrived.push((entity, *fleet));
        }
    }

    arrived.sort_by_key(|(_, fleet)| fleet.id);

    let mut arrivals = Vec::with_capacity(arrived.len());
    for (entity, fleet) in arrived {
        let _ = world.despawn(entity);
        if let Some(target) = planets.get_mut(fleet.target.index()) {
            let outcome = resolve_arrival(&fleet, target);
            arrivals.push(Arrival { fleet, outcome });
        }
    }
    arrivals
}

/// Step one fleet. Returns true once it is within `threshold` of `destination`.
///
/// A step that would carry the fleet past the arrival ring lands it on the
/// target instead, so long frames cannot skip an arrival.
fn advance(pos: &mut Position, vel: &Velocity, destination: Vec2, threshold: f32, delta_seconds: f32) -> bool {
    let remaining = pos.0.distance(&destination);
    if remaining <= threshold {
        return true;
    }

    let step = vel.0.length() * delta_seconds;
    if step >= remaining - threshold {
        pos.0 = destination;
        return true;
    }

    pos.0 = pos.0 + vel.0 * delta_seconds;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Faction, FleetId, PlanetId};

    fn spawn_fleet(world: &mut World, id: u64, owner: Faction, ships: f32, from: Vec2, target: PlanetId, to: Vec2) {
        let bundle = Fleet::launch(FleetId(id), owner, ships, from, target, to, 100.0).unwrap();
        world.spawn(bundle);
    }

    #[test]
    fn test_fleet_moves_without_arriving() {
        let mut world = World::new();
        let mut planets = vec![Planet::new(Vec2::new(300.0, 0.0), 20.0, Faction::Enemy, 30.0, 1.0)];
        spawn_fleet(&mut world, 0, Faction::Player, 50.0, Vec2::ZERO, PlanetId(0), Vec2::new(300.0, 0.0));

        let arrivals = transit_system(&mut world, &mut planets, 5.0, 1.0);

        assert!(arrivals.is_empty());
        let positions: Vec<Vec2> = world.query::<&Position>().iter().map(|(_, p)| p.0).collect();
        assert_eq!(positions.len(), 1);
        assert!((positions[0].x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_arrival_resolves_and_despawns() {
        let mut world = World::new();
        let mut planets = vec![Planet::new(Vec2::new(300.0, 0.0), 20.0, Faction::Enemy, 30.0, 1.0)];
        spawn_fleet(&mut world, 0, Faction::Player, 50.0, Vec2::ZERO, PlanetId(0), Vec2::new(300.0, 0.0));

        let mut arrivals = Vec::new();
        for _ in 0..3 {
            arrivals.extend(transit_system(&mut world, &mut planets, 5.0, 1.0));
        }

        assert_eq!(arrivals.len(), 1);
        assert!(arrivals[0].outcome.is_conquest());
        assert_eq!(world.len(), 0);
        assert_eq!(planets[0].owner(), Faction::Player);
        assert!((planets[0].units() - 20.0).abs() < 1e-4);

        // Nothing left to resolve a second time
        assert!(transit_system(&mut world, &mut planets, 5.0, 1.0).is_empty());
    }

    #[test]
    fn test_same_tick_arrivals_resolve_in_launch_order() {
        let mut world = World::new();
        let target = Vec2::new(50.0, 0.0);
        let mut planets = vec![Planet::new(target, 20.0, Faction::Neutral, 10.0, 1.0)];

        // Later launch spawned first to make sure ordering is by id
        spawn_fleet(&mut world, 7, Faction::Enemy, 30.0, Vec2::new(100.0, 0.0), PlanetId(0), target);
        spawn_fleet(&mut world, 2, Faction::Player, 15.0, Vec2::ZERO, PlanetId(0), target);

        let arrivals = transit_system(&mut world, &mut planets, 5.0, 1.0);

        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0].fleet.id, FleetId(2));
        assert_eq!(arrivals[1].fleet.id, FleetId(7));
        // Player takes it with 5, then the enemy takes it with 25
        assert_eq!(planets[0].owner(), Faction::Enemy);
        assert!((planets[0].units() - 25.0).abs() < 1e-4);
    }
}

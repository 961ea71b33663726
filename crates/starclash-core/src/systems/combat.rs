//! Combat resolution - what a fleet does to the planet it reaches.
//!
//! Same owner: the fleet lands as reinforcements. Otherwise the larger
//! side wins; on a tie the defender holds with nothing left.

use serde::{Deserialize, Serialize};

use crate::components::{Faction, Fleet, Planet};

/// Result of a single arrival
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArrivalOutcome {
    /// Friendly landing; `units` is the new garrison
    Reinforced { units: f32 },
    /// Attacker took the planet with `survivors` left over
    Conquered { previous: Faction, survivors: f32 },
    /// Defender held with `remaining` units
    Repelled { remaining: f32 },
}

impl ArrivalOutcome {
    pub fn is_conquest(&self) -> bool {
        matches!(self, ArrivalOutcome::Conquered { .. })
    }
}

/// Apply `fleet` to `target`. Must be called exactly once per fleet.
pub fn resolve_arrival(fleet: &Fleet, target: &mut Planet) -> ArrivalOutcome {
    if target.owner == fleet.owner {
        target.units += fleet.ships;
        return ArrivalOutcome::Reinforced { units: target.units };
    }

    if fleet.ships > target.units {
        let previous = target.owner;
        target.units = fleet.ships - target.units;
        target.owner = fleet.owner;
        ArrivalOutcome::Conquered {
            previous,
            survivors: target.units,
        }
    } else {
        target.units = (target.units - fleet.ships).max(0.0);
        ArrivalOutcome::Repelled {
            remaining: target.units,
        }
    }
}

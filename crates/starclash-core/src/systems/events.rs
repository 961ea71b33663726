//! Simulation event log.
//!
//! The engine appends an event for every transition the presentation
//! layer may want to react to (sounds, toasts, combo popups). The log is
//! drained by the caller; the engine never reads it back. Callers that
//! never drain only ever hold the newest `EVENT_LOG_CAPACITY` events.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::components::{Faction, FleetId, PlanetId};

/// Things that happened during a tick or command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    FleetLaunched {
        fleet: FleetId,
        owner: Faction,
        from: PlanetId,
        to: PlanetId,
        ships: u32,
    },
    Reinforced {
        fleet: FleetId,
        planet: PlanetId,
        units: f32,
    },
    Conquered {
        fleet: FleetId,
        planet: PlanetId,
        previous: Faction,
        by: Faction,
        survivors: f32,
    },
    Repelled {
        fleet: FleetId,
        planet: PlanetId,
        remaining: f32,
    },
    BoostActivated,
    BoostExpired,
    ComboReset,
    SessionEnded {
        won: bool,
    },
    Restarted,
}

/// Events kept before the oldest start being discarded
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// Bounded buffer of `SimEvent`s. Once full, each push drops the oldest
/// pending event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<SimEvent>,
    /// Events discarded since the last drain
    dropped: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        if self.events.len() >= EVENT_LOG_CAPACITY {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<SimEvent> {
        if self.dropped > 0 {
            log::debug!("Event log overflowed; {} events were discarded", self.dropped);
            self.dropped = 0;
        }
        self.events.drain(..).collect()
    }
}

//! StarClash Core - Planet Conquest Simulation Engine
//!
//! A real-time territorial conquest simulation: planets owned by the
//! player, a scripted opponent or nobody produce ships over time, and
//! both sides send fleets between planets to reinforce or conquer.
//!
//! # Architecture
//!
//! - **Components**: plain data (`Planet`, fleet `Fleet`/`Position`/`Velocity`)
//! - **Systems**: production, transit, combat, opponent policy, boost/combo timers
//! - **Generation**: random, non-overlapping planet placement
//! - **Engine**: `Simulation`, which owns all state and exposes the
//!   commands an input layer fires and the views a renderer polls
//!
//! Planets live in an arena addressed by `PlanetId`; fleets are `hecs`
//! entities that reference their target by id. Randomness and wall-clock
//! time are injected so matches replay exactly under a fixed seed.
//!
//! # Example
//!
//! ```rust,no_run
//! use starclash_core::prelude::*;
//!
//! let mut sim = Simulation::new(Profile::Extended.config(), 42)?;
//!
//! // Input layer: select planet 0, then order an attack on planet 2
//! sim.dispatch(PlanetId(0), PlanetId(2), sim.send_ratio());
//!
//! // Frame scheduler
//! loop {
//!     sim.tick(1.0 / 60.0);
//!     let _frame = sim.snapshot();
//!     if sim.session().is_ended() {
//!         break;
//!     }
//! }
//! # Ok::<(), starclash_core::config::ConfigError>(())
//! ```

pub mod clock;
pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::components::*;
    pub use crate::config::{Profile, SimConfig, TargetPreference};
    pub use crate::engine::{PointerOutcome, Simulation};
    pub use crate::snapshot::{MatchSummary, Rating, Scoreboard, SessionState, SimSnapshot};
    pub use crate::systems::{BoostState, SimEvent};
}

//! Simulation engine - main entry point for running a match

use std::time::Duration;

use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{Clock, SystemClock};
use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::generation::generate_planets;
use crate::snapshot::*;
use crate::systems::*;

/// Result of a pointer press, as seen by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// A player planet is now selected
    Selected(PlanetId),
    /// Selection was cleared without an order
    Cleared,
    /// An order went out from the previous selection
    Dispatched(FleetId),
    /// Nothing changed
    Ignored,
}

/// Main simulation engine.
///
/// Owns every planet (arena, addressed by `PlanetId`) and every fleet in
/// flight (ECS world). Randomness and wall-clock time are injected so a
/// match can be replayed exactly.
pub struct Simulation<R = StdRng, C = SystemClock> {
    config: SimConfig,
    rng: R,
    clock: C,

    planets: Vec<Planet>,
    /// Fleets in flight
    fleets: World,
    next_fleet_id: u64,

    selected: Option<PlanetId>,
    send_all: bool,
    boost: BoostState,
    combo: ComboTracker,
    session: SessionState,

    /// Accepted simulation seconds since start or restart
    sim_time: f64,
    started_at: Duration,
    ended_at: Option<Duration>,
    events: EventLog,
}

impl Simulation<StdRng, SystemClock> {
    /// New match with a seeded rng and the real clock
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_parts(config, StdRng::seed_from_u64(seed), SystemClock::new())
    }
}

impl<R: Rng, C: Clock> Simulation<R, C> {
    /// New match generated from `config` with the given rng and clock.
    /// Fails if the configuration does not validate.
    pub fn with_parts(config: SimConfig, mut rng: R, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let planets = generate_planets(&config.arena, &config.planets, &mut rng);
        Self::from_planets(config, planets, rng, clock)
    }

    /// New match over a hand-built map
    pub fn from_planets(config: SimConfig, planets: Vec<Planet>, rng: R, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let started_at = clock.now();
        log::info!("Match started with {} planets", planets.len());
        Ok(Self {
            config,
            rng,
            clock,
            planets,
            fleets: World::new(),
            next_fleet_id: 0,
            selected: None,
            send_all: false,
            boost: BoostState::new(),
            combo: ComboTracker::new(),
            session: SessionState::Running,
            sim_time: 0.0,
            started_at,
            ended_at: None,
            events: EventLog::new(),
        })
    }

    /// Advance the match by `elapsed_seconds`.
    ///
    /// Order within a tick: timers, production, transit and combat, opponent
    /// policy, win check. Deltas that are negative, non-finite or at least
    /// `max_tick_delta` are treated as zero-length. Once the session has
    /// ended this does nothing until `restart`.
    pub fn tick(&mut self, elapsed_seconds: f32) {
        if self.session.is_ended() {
            return;
        }

        let dt = self.accept_delta(elapsed_seconds);
        self.sim_time += dt as f64;
        let now = self.clock.now();

        // Timers
        if self.boost.update(dt) {
            log::debug!("Boost expired");
            self.events.push(SimEvent::BoostExpired);
        }
        if self.config.combo.enabled && self.combo.decay(now, &self.config.combo) {
            self.events.push(SimEvent::ComboReset);
        }

        // Production
        let boost = self.boost.multiplier(&self.config.boost);
        production_system(&mut self.planets, &self.config.planets, boost, dt);

        // Transit and combat
        let arrivals = transit_system(
            &mut self.fleets,
            &mut self.planets,
            self.config.fleets.arrival_threshold,
            dt,
        );
        for arrival in arrivals {
            self.record_arrival(arrival, now);
        }

        // Opponent
        if let Some(order) = plan_opponent_order(&self.planets, &self.config.opponent, &mut self.rng) {
            self.launch(order.source, order.target, order.fraction, Faction::Enemy);
        }

        // Selection must always point at a player planet
        if let Some(id) = self.selected {
            if !self.planet(id).is_some_and(|p| p.is_owned_by(Faction::Player)) {
                self.selected = None;
            }
        }

        self.check_session_end(now);
    }

    fn accept_delta(&self, elapsed_seconds: f32) -> f32 {
        if elapsed_seconds.is_finite() && (0.0..self.config.max_tick_delta).contains(&elapsed_seconds) {
            elapsed_seconds
        } else {
            log::debug!("Discarding frame delta {}", elapsed_seconds);
            0.0
        }
    }

    fn record_arrival(&mut self, arrival: Arrival, now: Duration) {
        let Arrival { fleet, outcome } = arrival;
        let event = match outcome {
            ArrivalOutcome::Reinforced { units } => SimEvent::Reinforced {
                fleet: fleet.id,
                planet: fleet.target,
                units,
            },
            ArrivalOutcome::Conquered { previous, survivors } => {
                log::info!(
                    "Planet {} taken by {} from {} ({:.0} survivors)",
                    fleet.target.index(),
                    fleet.owner,
                    previous,
                    survivors
                );
                if fleet.owner == Faction::Player {
                    self.combo.record_conquest(now, &self.config.combo);
                }
                SimEvent::Conquered {
                    fleet: fleet.id,
                    planet: fleet.target,
                    previous,
                    by: fleet.owner,
                    survivors,
                }
            }
            ArrivalOutcome::Repelled { remaining } => SimEvent::Repelled {
                fleet: fleet.id,
                planet: fleet.target,
                remaining,
            },
        };
        self.events.push(event);
    }

    fn check_session_end(&mut self, now: Duration) {
        let enemy = self.planets.iter().filter(|p| p.is_owned_by(Faction::Enemy)).count();
        let player = self.planets.iter().filter(|p| p.is_owned_by(Faction::Player)).count();

        let outcome = if enemy == 0 {
            SessionState::Won
        } else if player == 0 {
            SessionState::Lost
        } else {
            return;
        };

        self.session = outcome;
        self.ended_at = Some(now);
        self.selected = None;
        log::info!(
            "Match over: {} after {:.1}s of play",
            if outcome.is_won() { "victory" } else { "defeat" },
            now.saturating_sub(self.started_at).as_secs_f32()
        );
        self.events.push(SimEvent::SessionEnded {
            won: outcome.is_won(),
        });
    }

    /// Send `floor(units * ratio)` ships from a player planet to `target`.
    ///
    /// Ignored (returns `None`, changes nothing) unless the source is a
    /// player planet holding at least one unit, the order yields at least
    /// one ship, and the two planets are at distinct positions.
    pub fn dispatch(&mut self, source: PlanetId, target: PlanetId, ratio: f32) -> Option<FleetId> {
        if self.session.is_ended() {
            return None;
        }
        self.launch(source, target, ratio, Faction::Player)
    }

    fn launch(&mut self, source: PlanetId, target: PlanetId, ratio: f32, owner: Faction) -> Option<FleetId> {
        if source == target || !ratio.is_finite() || ratio <= 0.0 {
            return None;
        }
        let target_position = self.planets.get(target.index())?.position();
        let src = self.planets.get(source.index())?;
        if !src.is_owned_by(owner) || src.units() < 1.0 {
            return None;
        }

        let ships = (src.units() * ratio.min(1.0)).floor() as u32;
        if ships == 0 {
            return None;
        }

        let id = FleetId(self.next_fleet_id);
        let bundle = Fleet::launch(
            id,
            owner,
            ships as f32,
            src.position(),
            target,
            target_position,
            self.config.fleets.speed,
        )?;

        self.next_fleet_id += 1;
        self.fleets.spawn(bundle);
        self.planets[source.index()].withdraw(ships);

        log::debug!(
            "{} fleet {} launched: {} ships from planet {} to planet {}",
            owner,
            id.0,
            ships,
            source.index(),
            target.index()
        );
        self.events.push(SimEvent::FleetLaunched {
            fleet: id,
            owner,
            from: source,
            to: target,
            ships,
        });
        Some(id)
    }

    /// Handle a pointer press at arena coordinates.
    ///
    /// Pressing empty space clears the selection. Pressing a planet while
    /// another is selected orders an attack with the current send ratio
    /// and clears the selection. Pressing a player planet otherwise
    /// selects it.
    pub fn select_or_dispatch(&mut self, x: f32, y: f32) -> PointerOutcome {
        if self.session.is_ended() {
            return PointerOutcome::Ignored;
        }

        let Some(hit) = self.planet_at(x, y) else {
            if self.selected.take().is_some() {
                return PointerOutcome::Cleared;
            }
            return PointerOutcome::Ignored;
        };

        match self.selected {
            Some(source) if source != hit => {
                self.selected = None;
                let ratio = self.send_ratio();
                match self.dispatch(source, hit, ratio) {
                    Some(fleet) => PointerOutcome::Dispatched(fleet),
                    None => PointerOutcome::Cleared,
                }
            }
            _ if self.planets[hit.index()].is_owned_by(Faction::Player) => {
                self.selected = Some(hit);
                PointerOutcome::Selected(hit)
            }
            _ => PointerOutcome::Ignored,
        }
    }

    /// First planet whose disc contains the point
    pub fn planet_at(&self, x: f32, y: f32) -> Option<PlanetId> {
        self.planets
            .iter()
            .position(|p| p.contains_point(x, y))
            .map(PlanetId)
    }

    pub fn toggle_send_all_mode(&mut self) -> bool {
        self.send_all = !self.send_all;
        self.send_all
    }

    pub fn send_all_mode(&self) -> bool {
        self.send_all
    }

    /// Ratio used by pointer orders in the current mode
    pub fn send_ratio(&self) -> f32 {
        if self.send_all {
            self.config.fleets.send_all_ratio
        } else {
            self.config.fleets.send_ratio
        }
    }

    /// Trigger the production boost. No-op while cooling down, when the
    /// boost is disabled, or after the match ended.
    pub fn activate_boost(&mut self) -> bool {
        if self.session.is_ended() || !self.boost.activate(&self.config.boost) {
            return false;
        }
        log::debug!("Boost activated for {}s", self.config.boost.duration_secs);
        self.events.push(SimEvent::BoostActivated);
        true
    }

    /// Start a fresh match on a new map. Only honoured once the current
    /// match has ended.
    pub fn restart(&mut self) -> bool {
        if !self.session.is_ended() {
            return false;
        }

        self.planets = generate_planets(&self.config.arena, &self.config.planets, &mut self.rng);
        self.fleets = World::new();
        self.next_fleet_id = 0;
        self.selected = None;
        self.send_all = false;
        self.boost = BoostState::new();
        self.combo = ComboTracker::new();
        self.session = SessionState::Running;
        self.sim_time = 0.0;
        self.started_at = self.clock.now();
        self.ended_at = None;
        self.events.push(SimEvent::Restarted);

        log::info!("Match restarted with {} planets", self.planets.len());
        true
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.index())
    }

    pub fn fleet_count(&self) -> usize {
        self.fleets.len() as usize
    }

    /// Fleets in flight, in launch order
    pub fn fleets(&self) -> Vec<FleetView> {
        let mut views: Vec<FleetView> = self
            .fleets
            .query::<(&Fleet, &Position, &Velocity)>()
            .iter()
            .map(|(_, (fleet, pos, vel))| FleetView {
                id: fleet.id,
                position: pos.0,
                ships: fleet.display_ships(),
                owner: fleet.owner,
                direction: vel.direction(),
                target: fleet.target,
            })
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    pub fn planet_views(&self) -> Vec<PlanetView> {
        self.planets
            .iter()
            .enumerate()
            .map(|(idx, p)| PlanetView {
                id: PlanetId(idx),
                position: p.position(),
                radius: p.radius(),
                owner: p.owner(),
                units: p.display_units(),
                production_rate: p.production_rate(),
            })
            .collect()
    }

    pub fn selection(&self) -> Option<PlanetId> {
        self.selected
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn boost(&self) -> BoostState {
        self.boost
    }

    pub fn combo(&self) -> u32 {
        self.combo.combo
    }

    pub fn conquered(&self) -> u32 {
        self.combo.conquered
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Pending events, oldest first. Call once per frame; only the newest
    /// `EVENT_LOG_CAPACITY` events are kept between drains.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub fn scoreboard(&self) -> Scoreboard {
        let mut board = Scoreboard {
            total_planets: self.planets.len() as u32,
            ..Scoreboard::default()
        };
        for planet in &self.planets {
            match planet.owner() {
                Faction::Player => {
                    board.player_planets += 1;
                    board.player_units += planet.display_units();
                }
                Faction::Enemy => {
                    board.enemy_planets += 1;
                    board.enemy_units += planet.display_units();
                }
                Faction::Neutral => board.neutral_planets += 1,
            }
        }
        if board.total_planets > 0 {
            board.progress = board.player_planets as f32 / board.total_planets as f32;
        }
        board
    }

    /// Final stats, once the match has ended
    pub fn summary(&self) -> Option<MatchSummary> {
        let ended_at = self.ended_at?;
        let won = self.session.is_won();
        let play_time_secs = ended_at.saturating_sub(self.started_at).as_secs_f32();
        Some(MatchSummary {
            won,
            play_time_secs,
            combo: self.combo.combo,
            conquered: self.combo.conquered,
            rating: Rating::grade(won, play_time_secs, self.combo.combo),
        })
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            sim_time: self.sim_time,
            planets: self.planet_views(),
            fleets: self.fleets(),
            selected: self.selected,
            send_all: self.send_all,
            session: self.session,
            boost: self.boost,
            combo: self.combo.combo,
            conquered: self.combo.conquered,
            scoreboard: self.scoreboard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::extended();
        config.planets.base_rate = 0.0;
        config.opponent.act_probability = 0.0;
        config
    }

    fn duel(config: SimConfig) -> Simulation<StdRng, ManualClock> {
        let planets = vec![
            Planet::new(Vec2::new(100.0, 300.0), 30.0, Faction::Player, 100.0, 2.0),
            Planet::new(Vec2::new(400.0, 300.0), 30.0, Faction::Enemy, 30.0, 2.0),
            Planet::new(Vec2::new(100.0, 100.0), 30.0, Faction::Enemy, 10.0, 2.0),
        ];
        Simulation::from_planets(config, planets, StdRng::seed_from_u64(1), ManualClock::new()).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let sim = Simulation::new(SimConfig::extended(), 42).unwrap();
        assert!(sim.planets().len() >= 3);
        assert_eq!(sim.fleet_count(), 0);
        assert_eq!(sim.session(), SessionState::Running);
        assert_eq!(sim.sim_time(), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = SimConfig::extended();
        config.planets.neutral_units_min = 30;
        config.planets.neutral_units_max = 10;
        assert!(matches!(
            Simulation::new(config, 1),
            Err(ConfigError::Invalid { field: "planets.neutral_units_max", .. })
        ));

        let mut config = SimConfig::extended();
        config.opponent.act_probability = f64::NAN;
        let result = Simulation::with_parts(config, StdRng::seed_from_u64(1), ManualClock::new());
        assert!(matches!(result, Err(ConfigError::Invalid { field: "opponent.act_probability", .. })));
    }

    #[test]
    fn test_dispatch_requires_player_source() {
        let mut sim = duel(quiet_config());
        assert!(sim.dispatch(PlanetId(1), PlanetId(0), 0.5).is_none());
        assert!(sim.dispatch(PlanetId(0), PlanetId(0), 0.5).is_none());
        assert!(sim.dispatch(PlanetId(0), PlanetId(9), 0.5).is_none());
        assert_eq!(sim.fleet_count(), 0);
        assert_eq!(sim.planets()[0].units(), 100.0);
    }

    #[test]
    fn test_dispatch_rejects_coincident_planets() {
        let planets = vec![
            Planet::new(Vec2::new(100.0, 100.0), 30.0, Faction::Player, 100.0, 2.0),
            Planet::new(Vec2::new(100.0, 100.0), 20.0, Faction::Enemy, 10.0, 2.0),
        ];
        let mut sim = Simulation::from_planets(quiet_config(), planets, StdRng::seed_from_u64(1), ManualClock::new()).unwrap();
        assert!(sim.dispatch(PlanetId(0), PlanetId(1), 0.5).is_none());
        assert_eq!(sim.planets()[0].units(), 100.0);
        assert_eq!(sim.fleet_count(), 0);
    }

    #[test]
    fn test_small_garrison_sends_nothing() {
        let planets = vec![
            Planet::new(Vec2::new(100.0, 100.0), 30.0, Faction::Player, 1.5, 2.0),
            Planet::new(Vec2::new(300.0, 100.0), 20.0, Faction::Enemy, 10.0, 2.0),
        ];
        let mut sim = Simulation::from_planets(quiet_config(), planets, StdRng::seed_from_u64(1), ManualClock::new()).unwrap();
        // floor(1.5 * 0.5) == 0
        assert!(sim.dispatch(PlanetId(0), PlanetId(1), 0.5).is_none());
        assert_eq!(sim.planets()[0].units(), 1.5);
    }

    #[test]
    fn test_pointer_select_then_dispatch() {
        let mut sim = duel(quiet_config());

        assert_eq!(sim.select_or_dispatch(400.0, 300.0), PointerOutcome::Ignored);
        assert_eq!(sim.select_or_dispatch(100.0, 300.0), PointerOutcome::Selected(PlanetId(0)));
        assert_eq!(sim.selection(), Some(PlanetId(0)));

        let outcome = sim.select_or_dispatch(405.0, 300.0);
        assert_eq!(outcome, PointerOutcome::Dispatched(FleetId(0)));
        assert_eq!(sim.selection(), None);
        assert_eq!(sim.planets()[0].units(), 50.0);
    }

    #[test]
    fn test_pointer_empty_space_clears() {
        let mut sim = duel(quiet_config());
        sim.select_or_dispatch(100.0, 300.0);
        assert_eq!(sim.select_or_dispatch(700.0, 550.0), PointerOutcome::Cleared);
        assert_eq!(sim.select_or_dispatch(700.0, 550.0), PointerOutcome::Ignored);
    }

    #[test]
    fn test_send_all_mode_ratio() {
        let mut sim = duel(quiet_config());
        assert_eq!(sim.send_ratio(), 0.5);
        assert!(sim.toggle_send_all_mode());
        assert_eq!(sim.send_ratio(), 0.9);

        sim.select_or_dispatch(100.0, 300.0);
        sim.select_or_dispatch(400.0, 300.0);
        assert_eq!(sim.planets()[0].units(), 10.0);
        assert_eq!(sim.fleets()[0].ships, 90);
    }

    #[test]
    fn test_oversized_delta_discarded() {
        let mut config = quiet_config();
        config.planets.base_rate = 0.5;
        let mut sim = duel(config);

        sim.tick(5.0);
        sim.tick(f32::NAN);
        sim.tick(-1.0);

        assert_eq!(sim.sim_time(), 0.0);
        assert_eq!(sim.planets()[0].units(), 100.0);
    }

    #[test]
    fn test_boost_no_op_on_cooldown() {
        let mut sim = duel(quiet_config());
        assert!(sim.activate_boost());
        assert!(!sim.activate_boost());
        let events = sim.drain_events();
        assert_eq!(events, vec![SimEvent::BoostActivated]);
    }

    #[test]
    fn test_restart_only_after_end() {
        let mut sim = duel(quiet_config());
        assert!(!sim.restart());
        assert_eq!(sim.planets().len(), 3);
    }

    #[test]
    fn test_selection_cleared_when_planet_lost() {
        let mut sim = duel(quiet_config());
        sim.select_or_dispatch(100.0, 300.0);
        sim.planets[0].owner = Faction::Enemy;
        sim.planets[1].owner = Faction::Player;
        sim.tick(0.1);
        assert_eq!(sim.selection(), None);
    }
}

//! StarClash Headless Match Harness
//!
//! Plays seeded matches of a scripted player against the opponent policy
//! and checks engine invariants after every tick. Runs entirely
//! in-process with no rendering or input devices.
//!
//! Usage:
//!   cargo run -p starclash-simtest
//!   cargo run -p starclash-simtest -- --verbose --seed 7
//!   cargo run -p starclash-simtest -- --help
//!   cargo run -p starclash-simtest -- --config my_tuning.json --json

use std::path::{Path, PathBuf};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use starclash_core::config::{ConfigError, OpponentProfile};
use starclash_core::generation::generate_planets;
use starclash_core::prelude::*;
use starclash_core::systems::{best_target, resolve_arrival};

const MATCHES_PER_PROFILE: u64 = 12;
const FRAME: f32 = 1.0 / 30.0;
/// Ten simulated minutes
const MAX_TICKS: u32 = 18_000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Parser)]
#[command(name = "starclash-simtest")]
#[command(about = "Run seeded StarClash matches and check engine invariants", long_about = None)]
struct Cli {
    /// Print every check, not just failures
    #[arg(long)]
    verbose: bool,

    /// Dump the final snapshot of the last match as JSON
    #[arg(long)]
    json: bool,

    /// Base seed for placement sweeps and matches
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Extra JSON configuration to run alongside the built-in profiles
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<SimConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
    SimConfig::from_json(&text).map_err(|e: ConfigError| e.to_string())
}

fn main() {
    env_logger::init();

    let options = Cli::parse();

    let mut profiles = vec![
        ("classic".to_string(), Profile::Classic.config()),
        ("extended".to_string(), Profile::Extended.config()),
    ];
    if let Some(path) = &options.config {
        match load_config(path) {
            Ok(config) => profiles.push((path.display().to_string(), config)),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(2);
            }
        }
    }

    println!("=== StarClash Match Harness (seed {}) ===\n", options.seed);

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_configs(&profiles));

    // 2. Placement sweep
    results.extend(validate_placement(&profiles, options.seed));

    // 3. Combat rule table
    results.extend(validate_combat_rule());

    // 4. Opponent targeting
    results.extend(validate_opponent_targeting());

    // 5. Full matches
    let mut last_snapshot = None;
    for (name, config) in &profiles {
        let (match_results, snapshot) = validate_matches(name, config, options.seed, options.verbose);
        results.extend(match_results);
        last_snapshot = snapshot.or(last_snapshot);
    }

    // 6. Replay determinism
    results.extend(validate_determinism(options.seed));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if options.json {
        if let Some(snapshot) = last_snapshot {
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("error: snapshot encoding failed: {}", e),
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_configs(profiles: &[(String, SimConfig)]) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    for (name, config) in profiles {
        let valid = config.validate();
        results.push(TestResult::new(
            &format!("config_valid_{}", name),
            valid.is_ok(),
            match valid {
                Ok(()) => "validates".to_string(),
                Err(e) => e.to_string(),
            },
        ));

        let roundtrip = config
            .to_json()
            .and_then(|json| SimConfig::from_json(&json))
            .map(|back| back == *config);
        results.push(TestResult::new(
            &format!("config_json_roundtrip_{}", name),
            matches!(roundtrip, Ok(true)),
            format!("{:?}", roundtrip.map_err(|e| e.to_string())),
        ));
    }

    results
}

// ── 2. Placement ────────────────────────────────────────────────────────

fn validate_placement(profiles: &[(String, SimConfig)], seed: u64) -> Vec<TestResult> {
    println!("--- Placement ---");
    let mut results = Vec::new();

    for (name, config) in profiles {
        let mut overlaps = 0;
        let mut out_of_bounds = 0;
        let mut short_maps = 0;
        let mut bad_owners = 0;

        for s in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(s));
            let planets = generate_planets(&config.arena, &config.planets, &mut rng);
            let arena = &config.arena;

            if planets.len() < config.arena.planet_count as usize {
                short_maps += 1;
            }
            for (i, a) in planets.iter().enumerate() {
                let p = a.position();
                if p.x < arena.margin
                    || p.x > arena.width - arena.margin
                    || p.y < arena.margin
                    || p.y > arena.height - arena.margin
                {
                    out_of_bounds += 1;
                }
                for b in &planets[i + 1..] {
                    if a.position().distance(&b.position()) < a.radius() + b.radius() + arena.spacing {
                        overlaps += 1;
                    }
                }
            }

            let players = config.planets.player_start_planets as usize;
            let enemies = config.planets.enemy_start_planets as usize;
            for (i, planet) in planets.iter().enumerate() {
                let expected = if i < players {
                    Faction::Player
                } else if i < players + enemies {
                    Faction::Enemy
                } else {
                    Faction::Neutral
                };
                if planet.owner() != expected {
                    bad_owners += 1;
                }
            }
        }

        results.push(TestResult::new(
            &format!("placement_spacing_{}", name),
            overlaps == 0 && out_of_bounds == 0,
            format!("{} overlaps, {} out of bounds over 100 maps", overlaps, out_of_bounds),
        ));
        results.push(TestResult::new(
            &format!("placement_owners_{}", name),
            bad_owners == 0,
            format!("{} misassigned owners, {} maps short of planets", bad_owners, short_maps),
        ));
    }

    results
}

// ── 3. Combat ───────────────────────────────────────────────────────────

fn validate_combat_rule() -> Vec<TestResult> {
    println!("--- Combat ---");
    let mut mismatches = Vec::new();

    for attack in 0..60u32 {
        for defend in 0..60u32 {
            let mut target = Planet::new(Vec2::ZERO, 20.0, Faction::Enemy, defend as f32, 1.0);
            let fleet = Fleet {
                id: FleetId(0),
                owner: Faction::Player,
                ships: attack as f32,
                target: PlanetId(0),
            };
            resolve_arrival(&fleet, &mut target);

            let (owner, units) = if attack > defend {
                (Faction::Player, (attack - defend) as f32)
            } else {
                (Faction::Enemy, (defend - attack) as f32)
            };
            if target.owner() != owner || target.units() != units {
                mismatches.push(format!("{} vs {}", attack, defend));
            }
        }
    }

    vec![TestResult::new(
        "combat_rule_table",
        mismatches.is_empty(),
        if mismatches.is_empty() {
            "3600 cases match".to_string()
        } else {
            format!("{} mismatches, first: {}", mismatches.len(), mismatches[0])
        },
    )]
}

// ── 4. Opponent targeting ───────────────────────────────────────────────

fn validate_opponent_targeting() -> Vec<TestResult> {
    println!("--- Opponent ---");
    let planets = vec![
        Planet::new(Vec2::new(100.0, 100.0), 30.0, Faction::Enemy, 90.0, 2.0),
        Planet::new(Vec2::new(300.0, 100.0), 30.0, Faction::Player, 40.0, 2.0),
        Planet::new(Vec2::new(100.0, 300.0), 30.0, Faction::Neutral, 20.0, 2.0),
    ];

    let neutral_first = best_target(&planets, PlanetId(0), &OpponentProfile::neutral_first());
    let player_first = best_target(&planets, PlanetId(0), &OpponentProfile::player_first());

    vec![
        TestResult::new(
            "opponent_neutral_first",
            neutral_first == Some(PlanetId(2)),
            format!("picked {:?}", neutral_first),
        ),
        TestResult::new(
            "opponent_player_first",
            player_first == Some(PlanetId(1)),
            format!("picked {:?}", player_first),
        ),
    ]
}

// ── 5. Matches ──────────────────────────────────────────────────────────

/// Greedy scripted player: every second, the strongest player planet
/// attacks the closest planet it outnumbers.
fn scripted_player_move(sim: &mut Simulation<StdRng, ManualClock>) {
    let planets = sim.planets();
    let Some((source, src)) = planets
        .iter()
        .enumerate()
        .filter(|(_, p)| p.owner() == Faction::Player)
        .max_by(|a, b| a.1.units().total_cmp(&b.1.units()))
    else {
        return;
    };

    let sendable = (src.units() * sim.send_ratio()).floor();
    let target = planets
        .iter()
        .enumerate()
        .filter(|(_, p)| p.owner() != Faction::Player && p.units() < sendable)
        .min_by(|a, b| {
            let da = a.1.position().distance(&src.position());
            let db = b.1.position().distance(&src.position());
            da.total_cmp(&db)
        })
        .map(|(i, _)| PlanetId(i));

    if let Some(target) = target {
        let ratio = sim.send_ratio();
        sim.dispatch(PlanetId(source), target, ratio);
    }
}

fn check_invariants(sim: &Simulation<StdRng, ManualClock>) -> Result<(), String> {
    for (i, p) in sim.planets().iter().enumerate() {
        if !(p.units() >= 0.0 && p.units().is_finite()) {
            return Err(format!("planet {} has {} units", i, p.units()));
        }
    }
    for f in sim.fleets() {
        if !f.position.is_finite() {
            return Err(format!("fleet {:?} at non-finite position", f.id));
        }
    }
    if let Some(id) = sim.selection() {
        if sim.planet(id).map(|p| p.owner()) != Some(Faction::Player) {
            return Err(format!("selection {:?} is not a player planet", id));
        }
    }
    let boost = sim.boost();
    if boost.active && boost.time_left <= 0.0 {
        return Err("boost active with no time left".into());
    }
    if boost.cooldown < 0.0 {
        return Err("negative boost cooldown".into());
    }
    Ok(())
}

fn validate_matches(
    name: &str,
    config: &SimConfig,
    seed: u64,
    verbose: bool,
) -> (Vec<TestResult>, Option<SimSnapshot>) {
    println!("--- Matches ({}) ---", name);
    let mut results = Vec::new();
    let mut wins = 0;
    let mut losses = 0;
    let mut undecided = 0;
    let mut violations = Vec::new();
    let mut frozen_failures = 0;
    let mut missing_summaries = 0;
    let mut last_snapshot = None;

    for m in 0..MATCHES_PER_PROFILE {
        let clock = ManualClock::new();
        let mut sim = match Simulation::with_parts(
            config.clone(),
            StdRng::seed_from_u64(seed.wrapping_mul(1000).wrapping_add(m)),
            clock.clone(),
        ) {
            Ok(sim) => sim,
            Err(e) => {
                results.push(TestResult::new(&format!("match_setup_{}", name), false, e.to_string()));
                return (results, None);
            }
        };

        let mut ticks = 0;
        while !sim.session().is_ended() && ticks < MAX_TICKS {
            if ticks % 30 == 0 {
                scripted_player_move(&mut sim);
            }
            if ticks % 1200 == 0 {
                sim.activate_boost();
            }
            sim.tick(FRAME);
            clock.advance_secs(FRAME);
            ticks += 1;

            if let Err(e) = check_invariants(&sim) {
                violations.push(format!("match {} tick {}: {}", m, ticks, e));
                break;
            }
        }

        match sim.session() {
            SessionState::Won => wins += 1,
            SessionState::Lost => losses += 1,
            SessionState::Running => undecided += 1,
        }

        if sim.session().is_ended() {
            let before = sim.snapshot();
            for _ in 0..60 {
                sim.tick(FRAME);
            }
            if sim.snapshot() != before {
                frozen_failures += 1;
            }
            match sim.summary() {
                Some(summary) if verbose => println!(
                    "  match {}: {:?} after {:.0}s, conquered {}, rating {:?}",
                    m,
                    sim.session(),
                    summary.play_time_secs,
                    summary.conquered,
                    summary.rating
                ),
                Some(_) => {}
                None => missing_summaries += 1,
            }
        }

        let events = sim.drain_events();
        log::debug!("match {} produced {} events", m, events.len());
        last_snapshot = Some(sim.snapshot());
    }

    results.push(TestResult::new(
        &format!("match_invariants_{}", name),
        violations.is_empty(),
        if violations.is_empty() {
            format!("{} matches clean", MATCHES_PER_PROFILE)
        } else {
            violations.join("; ")
        },
    ));
    results.push(TestResult::new(
        &format!("match_frozen_after_end_{}", name),
        frozen_failures == 0,
        format!("{} ended matches changed after the end", frozen_failures),
    ));
    results.push(TestResult::new(
        &format!("match_outcomes_{}", name),
        missing_summaries == 0,
        format!(
            "{} won, {} lost, {} undecided, {} ended without a summary",
            wins, losses, undecided, missing_summaries
        ),
    ));

    (results, last_snapshot)
}

// ── 6. Determinism ──────────────────────────────────────────────────────

fn replay(seed: u64) -> Result<SimSnapshot, ConfigError> {
    let clock = ManualClock::new();
    let mut sim = Simulation::with_parts(Profile::Extended.config(), StdRng::seed_from_u64(seed), clock.clone())?;
    for t in 0..3000 {
        if t % 30 == 0 {
            scripted_player_move(&mut sim);
        }
        sim.tick(FRAME);
        clock.advance_secs(FRAME);
    }
    Ok(sim.snapshot())
}

fn validate_determinism(seed: u64) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let result = match (replay(seed), replay(seed)) {
        (Ok(a), Ok(b)) => TestResult::new(
            "replay_identical",
            a == b,
            format!("{} planets, {} fleets at t={:.1}s", a.planets.len(), a.fleets.len(), a.sim_time),
        ),
        (Err(e), _) | (_, Err(e)) => TestResult::new("replay_identical", false, e.to_string()),
    };
    vec![result]
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["starclash-simtest"]).unwrap();
        assert!(!cli.verbose && !cli.json);
        assert_eq!(cli.seed, 1);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_value_flags() {
        let cli = Cli::try_parse_from(["starclash-simtest", "--seed", "7", "--config", "tuning.json", "--json"]).unwrap();
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.config, Some(PathBuf::from("tuning.json")));
        assert!(cli.json);

        assert!(Cli::try_parse_from(["starclash-simtest", "--seed", "many"]).is_err());
    }
}

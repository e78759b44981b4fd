//! Combat Bridge - smoke run
//!
//! Plays one round on the in-process scripted host against a wandering
//! opponent, with every callback routed through the bridge to the configured
//! decision service. Prints the bridge counters when the round ends.

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use combat_bridge::bridge::{Bridge, BridgeStats, RobotController, TriggerPolicy};
use combat_bridge::core::config::BridgeConfig;
use combat_bridge::core::error::Result;
use combat_bridge::core::types::{normalize_absolute_degrees, normalize_relative_degrees, Tick};
use combat_bridge::host::{AgentState, Bullet, CombatEvent, EnemyObservation, ScriptedHost};

const OPPONENT: &str = "sample.Wanderer";

/// Drive one scripted round through the bridge
#[derive(Parser, Debug)]
#[command(name = "combat-bridge")]
#[command(about = "Run one scripted round against a decision service")]
struct Args {
    /// TOML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Decision service host (overrides config and environment)
    #[arg(long)]
    host: Option<String>,

    /// Decision service port (overrides config and environment)
    #[arg(long)]
    port: Option<u16>,

    /// Trigger policy: reactive, periodic or both
    #[arg(long, value_parser = parse_trigger)]
    trigger: Option<TriggerPolicy>,

    /// Round length in ticks
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Battlefield width
    #[arg(long, default_value_t = 800.0, value_parser = parse_dimension)]
    width: f64,

    /// Battlefield height
    #[arg(long, default_value_t = 600.0, value_parser = parse_dimension)]
    height: f64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_trigger(s: &str) -> std::result::Result<TriggerPolicy, String> {
    match s {
        "reactive" => Ok(TriggerPolicy::Reactive),
        "periodic" => Ok(TriggerPolicy::Periodic),
        "both" => Ok(TriggerPolicy::Both),
        other => Err(format!("unknown trigger policy '{}'", other)),
    }
}

/// The opponent spawns at least 50 units from every wall
const MIN_DIMENSION: f64 = 100.0;

fn parse_dimension(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|e| format!("invalid dimension '{}': {}", s, e))?;
    if !value.is_finite() || value <= MIN_DIMENSION {
        return Err(format!(
            "battlefield dimension must be greater than {}, got {}",
            MIN_DIMENSION, s
        ));
    }
    Ok(value)
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    seed: u64,
    ticks: Tick,
    agent_energy: f64,
    opponent_energy: f64,
    shots_fired: usize,
    bridge: BridgeStats,
}

/// Opponent that drifts around the battlefield and shoots back now and then
struct Wanderer {
    x: f64,
    y: f64,
    heading: f64,
    velocity: f64,
    energy: f64,
}

impl Wanderer {
    fn new(rng: &mut StdRng, width: f64, height: f64) -> Self {
        Self {
            x: rng.gen_range(50.0..width - 50.0),
            y: rng.gen_range(50.0..height - 50.0),
            heading: rng.gen_range(0.0..360.0),
            velocity: 0.0,
            energy: 100.0,
        }
    }

    fn step(&mut self, rng: &mut StdRng, width: f64, height: f64) {
        if rng.gen_bool(0.05) {
            self.heading = normalize_absolute_degrees(self.heading + rng.gen_range(-90.0..90.0));
        }
        self.velocity = 8.0;
        let rad = self.heading.to_radians();
        self.x = (self.x + rad.sin() * self.velocity).clamp(18.0, width - 18.0);
        self.y = (self.y + rad.cos() * self.velocity).clamp(18.0, height - 18.0);
    }

    /// What the agent's scanner sees, relative to the agent's body
    fn observe(&self, agent: &AgentState) -> EnemyObservation {
        let dx = self.x - agent.x;
        let dy = self.y - agent.y;
        let absolute = dx.atan2(dy).to_degrees();
        EnemyObservation {
            name: OPPONENT.to_string(),
            bearing: normalize_relative_degrees(absolute - agent.heading),
            distance: dx.hypot(dy),
            heading: self.heading,
            velocity: self.velocity,
            energy: self.energy,
            time: agent.time,
        }
    }
}

fn bullet(agent: &AgentState, power: f64, owner: &str, victim: &str, id: i32) -> Bullet {
    Bullet {
        heading_radians: agent.gun_heading.to_radians(),
        x: agent.x,
        y: agent.y,
        power,
        owner_name: owner.to_string(),
        victim_name: victim.to_string(),
        is_active: false,
        bullet_id: id,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("combat_bridge=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    config.apply_env()?;
    if let Some(host) = args.host {
        config.service.host = host;
    }
    if let Some(port) = args.port {
        config.service.port = port;
    }
    if let Some(trigger) = args.trigger {
        config.decision.trigger = trigger;
    }

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut rng = StdRng::seed_from_u64(seed);

    tracing::info!(
        host = %config.service.host,
        port = config.service.port,
        trigger = ?config.decision.trigger,
        seed,
        "Combat Bridge starting..."
    );

    let mut bridge = Bridge::remote(&config)?;
    let mut host = ScriptedHost::new(args.width, args.height);
    let mut opponent = Wanderer::new(&mut rng, args.width, args.height);
    let mut bullet_id = 0;

    bridge.on_start(&mut host);

    while host.state().time < args.ticks {
        let tick = host.advance_tick();
        opponent.step(&mut rng, args.width, args.height);

        let shots_before = host.shots().len();
        let agent = *host.state();

        let observation = opponent.observe(&agent);
        if observation.distance < 400.0 && rng.gen_bool(0.3) {
            bridge.on_detect(&mut host, &observation);
        }

        if rng.gen_bool(0.01) {
            bullet_id += 1;
            let power = rng.gen_range(0.5..3.0);
            host.state_mut().energy -= 4.0 * power;
            bridge.on_combat_event(&CombatEvent::HitByBullet {
                bearing: observation.bearing,
                bullet: bullet(&agent, power, OPPONENT, "self", bullet_id),
            });
        }
        let near_wall = agent.x <= 18.0
            || agent.y <= 18.0
            || agent.x >= args.width - 18.0
            || agent.y >= args.height - 18.0;
        if near_wall && agent.velocity != 0.0 {
            bridge.on_combat_event(&CombatEvent::HitWall { bearing: 180.0 });
        }

        bridge.on_tick(&mut host);

        // Shots committed this tick resolve immediately
        let new_shots = host.shots()[shots_before..].to_vec();
        for power in new_shots {
            bullet_id += 1;
            let agent = *host.state();
            if rng.gen_bool(0.4) {
                opponent.energy -= 4.0 * power;
                bridge.on_combat_event(&CombatEvent::BulletHit {
                    name: OPPONENT.to_string(),
                    energy: opponent.energy.max(0.0),
                    bullet: bullet(&agent, power, "self", OPPONENT, bullet_id),
                });
            } else {
                bridge.on_combat_event(&CombatEvent::BulletMissed {
                    bullet: bullet(&agent, power, "self", "", bullet_id),
                });
            }
        }

        if opponent.energy <= 0.0 {
            bridge.on_combat_event(&CombatEvent::RobotDeath {
                robot_name: OPPONENT.to_string(),
            });
            bridge.on_round_won();
            tracing::info!(tick, "Opponent destroyed");
            break;
        }
        if host.state().energy <= 0.0 {
            bridge.on_round_lost();
            tracing::info!(tick, "Agent destroyed");
            break;
        }
    }

    bridge.on_round_ended();
    bridge.shutdown();

    let result = RunResult {
        seed,
        ticks: host.state().time,
        agent_energy: host.state().energy,
        opponent_energy: opponent.energy,
        shots_fired: host.shots().len(),
        bridge: bridge.stats(),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

//! Minimal in-process host
//!
//! Applies committed commands instantly (no acceleration, no gun cooling)
//! and records every primitive call in order. Drives the smoke-run binary
//! and the tests; it is not a physics model.

use crate::core::types::{normalize_absolute_degrees, Tick};
use crate::host::{AgentState, Direction, RobotHost, Rotation};

/// Robots are 36 units wide; centres stay this far from the walls
const HALF_ROBOT: f64 = 18.0;

/// One primitive call as seen by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    /// Signed distance, positive = forward
    Move(f64),
    /// Signed degrees, positive = clockwise
    Turn(f64),
    TurnGun(f64),
    TurnRadar(f64),
    Fire(f64),
    Execute,
    AdjustGunForBodyTurn(bool),
    AdjustRadarForGunTurn(bool),
}

#[derive(Debug, Default, Clone, Copy)]
struct Pending {
    movement: Option<f64>,
    turn: Option<f64>,
    gun: Option<f64>,
    radar: Option<f64>,
    fire: Option<f64>,
}

pub struct ScriptedHost {
    state: AgentState,
    pending: Pending,
    gun_independent: bool,
    radar_independent: bool,
    log: Vec<HostCommand>,
    shots: Vec<f64>,
}

impl ScriptedHost {
    /// Agent at the centre of a `width` x `height` battlefield, facing north
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_state(AgentState {
            x: width / 2.0,
            y: height / 2.0,
            heading: 0.0,
            gun_heading: 0.0,
            radar_heading: 0.0,
            velocity: 0.0,
            energy: 100.0,
            gun_heat: 0.0,
            gun_turn_remaining: 0.0,
            radar_turn_remaining: 0.0,
            battlefield_width: width,
            battlefield_height: height,
            round_num: 0,
            time: 0,
        })
    }

    pub fn with_state(state: AgentState) -> Self {
        Self {
            state,
            pending: Pending::default(),
            gun_independent: false,
            radar_independent: false,
            log: Vec::new(),
            shots: Vec::new(),
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn set_time(&mut self, tick: Tick) {
        self.state.time = tick;
    }

    pub fn advance_tick(&mut self) -> Tick {
        self.state.time += 1;
        self.state.time
    }

    /// Every primitive call since construction (or the last `clear_log`)
    pub fn log(&self) -> &[HostCommand] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Movement, turn and fire commands only: radar sweeps, commits and
    /// turret setup are dropped
    pub fn action_log(&self) -> Vec<HostCommand> {
        self.log
            .iter()
            .copied()
            .filter(|c| {
                !matches!(
                    c,
                    HostCommand::TurnRadar(_)
                        | HostCommand::Execute
                        | HostCommand::AdjustGunForBodyTurn(_)
                        | HostCommand::AdjustRadarForGunTurn(_)
                )
            })
            .collect()
    }

    /// Fire power of every committed shot
    pub fn shots(&self) -> &[f64] {
        &self.shots
    }

    fn commit(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        if let Some(turn) = pending.turn {
            self.state.heading = normalize_absolute_degrees(self.state.heading + turn);
            if !self.gun_independent {
                self.state.gun_heading = normalize_absolute_degrees(self.state.gun_heading + turn);
            }
        }
        if let Some(gun) = pending.gun {
            self.state.gun_heading = normalize_absolute_degrees(self.state.gun_heading + gun);
            if !self.radar_independent {
                self.state.radar_heading =
                    normalize_absolute_degrees(self.state.radar_heading + gun);
            }
        }
        if let Some(radar) = pending.radar {
            self.state.radar_heading = normalize_absolute_degrees(self.state.radar_heading + radar);
        }
        if let Some(distance) = pending.movement {
            let rad = self.state.heading.to_radians();
            let max_x = (self.state.battlefield_width - HALF_ROBOT).max(HALF_ROBOT);
            let max_y = (self.state.battlefield_height - HALF_ROBOT).max(HALF_ROBOT);
            self.state.x = (self.state.x + rad.sin() * distance).clamp(HALF_ROBOT, max_x);
            self.state.y = (self.state.y + rad.cos() * distance).clamp(HALF_ROBOT, max_y);
            self.state.velocity = distance.signum() * distance.abs().min(8.0);
        } else {
            self.state.velocity = 0.0;
        }
        if let Some(power) = pending.fire {
            if self.state.gun_heat <= 0.0 && self.state.energy > power {
                self.state.energy -= power;
                self.shots.push(power);
            }
        }
    }
}

impl RobotHost for ScriptedHost {
    fn agent_state(&self) -> AgentState {
        self.state
    }

    fn set_move(&mut self, direction: Direction, distance: f64) {
        let signed = match direction {
            Direction::Forward => distance,
            Direction::Backward => -distance,
        };
        self.log.push(HostCommand::Move(signed));
        self.pending.movement = Some(signed);
    }

    fn set_turn(&mut self, rotation: Rotation, degrees: f64) {
        let signed = signed_degrees(rotation, degrees);
        self.log.push(HostCommand::Turn(signed));
        self.pending.turn = Some(signed);
    }

    fn set_turn_gun(&mut self, rotation: Rotation, degrees: f64) {
        let signed = signed_degrees(rotation, degrees);
        self.log.push(HostCommand::TurnGun(signed));
        self.pending.gun = Some(signed);
    }

    fn set_turn_radar(&mut self, rotation: Rotation, degrees: f64) {
        let signed = signed_degrees(rotation, degrees);
        self.log.push(HostCommand::TurnRadar(signed));
        self.pending.radar = Some(signed);
    }

    fn set_fire(&mut self, power: f64) {
        self.log.push(HostCommand::Fire(power));
        self.pending.fire = Some(power);
    }

    fn execute(&mut self) {
        self.log.push(HostCommand::Execute);
        self.commit();
    }

    fn set_adjust_gun_for_body_turn(&mut self, independent: bool) {
        self.log.push(HostCommand::AdjustGunForBodyTurn(independent));
        self.gun_independent = independent;
    }

    fn set_adjust_radar_for_gun_turn(&mut self, independent: bool) {
        self.log.push(HostCommand::AdjustRadarForGunTurn(independent));
        self.radar_independent = independent;
    }
}

fn signed_degrees(rotation: Rotation, degrees: f64) -> f64 {
    match rotation {
        Rotation::Right => degrees,
        Rotation::Left => -degrees,
    }
}

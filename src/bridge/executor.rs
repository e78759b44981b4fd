//! Action executor: ordered action list -> primitive host commands
//!
//! Commands apply in list order within the current tick. Fire power is
//! clamped to what the host accepts; unknown or malformed commands are
//! skipped without touching the host and without aborting the batch.

use crate::host::{Direction, RobotHost, Rotation};
use crate::protocol::messages::{ActionCommand, ActionType};
use serde::Serialize;

pub const MIN_FIRE_POWER: f64 = 0.1;
pub const MAX_FIRE_POWER: f64 = 3.0;

/// Clamp a requested fire power into [0.1, 3.0]
pub fn clamp_fire_power(power: f64) -> f64 {
    power.clamp(MIN_FIRE_POWER, MAX_FIRE_POWER)
}

/// What one `apply` call did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Commands that reached the host
    pub applied: usize,
    /// Explicit no-ops
    pub idle: usize,
    /// Unknown or malformed commands skipped
    pub ignored: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ActionExecutor {
    commit_each: bool,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ActionExecutor {
    /// `commit_each`: call `execute` after every applied command so it takes
    /// effect before the next one. Without it the host's own end-of-tick
    /// commit applies the batch.
    pub fn new(commit_each: bool) -> Self {
        Self { commit_each }
    }

    pub fn apply(&self, host: &mut dyn RobotHost, actions: &[ActionCommand]) -> ExecutionReport {
        tracing::debug!(count = actions.len(), "Performing actions");
        let mut report = ExecutionReport::default();

        for action in actions {
            match self.apply_one(host, action) {
                Applied::Host => {
                    report.applied += 1;
                    if self.commit_each {
                        host.execute();
                    }
                }
                Applied::Idle => report.idle += 1,
                Applied::Ignored => report.ignored += 1,
            }
        }
        report
    }

    fn apply_one(&self, host: &mut dyn RobotHost, action: &ActionCommand) -> Applied {
        let value = action.value;
        tracing::debug!(action = ?action.action_type, value, "Executing action");

        match action.action_type {
            ActionType::DoNothing => {
                tracing::debug!("Doing nothing");
                return Applied::Idle;
            }
            ActionType::Unknown => {
                tracing::warn!(value, "Unsupported action, treating as no-op");
                return Applied::Ignored;
            }
            kind if !value.is_finite() => {
                tracing::warn!(action = ?kind, value, "Non-finite action value, treating as no-op");
                return Applied::Ignored;
            }
            ActionType::MoveForward => host.set_move(Direction::Forward, value),
            ActionType::MoveBackward => host.set_move(Direction::Backward, value),
            ActionType::TurnLeft => host.set_turn(Rotation::Left, value),
            ActionType::TurnRight => host.set_turn(Rotation::Right, value),
            ActionType::TurnGunLeft => host.set_turn_gun(Rotation::Left, value),
            ActionType::TurnGunRight => host.set_turn_gun(Rotation::Right, value),
            ActionType::RotateRadarLeft => host.set_turn_radar(Rotation::Left, value),
            ActionType::RotateRadarRight => host.set_turn_radar(Rotation::Right, value),
            ActionType::Fire => host.set_fire(clamp_fire_power(value)),
        }
        Applied::Host
    }
}

enum Applied {
    Host,
    Idle,
    Ignored,
}

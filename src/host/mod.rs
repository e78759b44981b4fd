//! Host-facing surface
//!
//! The simulation host owns physics and scheduling. The bridge only reads a
//! fresh `AgentState` snapshot each tick and issues the primitive "set"
//! commands below, committing them with `execute`.

pub mod scripted;

pub use scripted::{HostCommand, ScriptedHost};

use crate::core::types::Tick;

/// Body movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Turn direction (right = clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Left,
    Right,
}

impl Rotation {
    /// Split a signed angle (positive = clockwise) into direction + magnitude
    pub fn from_signed(degrees: f64) -> (Self, f64) {
        if degrees < 0.0 {
            (Rotation::Left, -degrees)
        } else {
            (Rotation::Right, degrees)
        }
    }
}

/// Snapshot of the controlled agent, read from the host every tick.
///
/// Angles are compass degrees: 0 = north, clockwise positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    pub velocity: f64,
    pub energy: f64,
    pub gun_heat: f64,
    pub gun_turn_remaining: f64,
    pub radar_turn_remaining: f64,
    pub battlefield_width: f64,
    pub battlefield_height: f64,
    pub round_num: i32,
    pub time: Tick,
}

/// One opponent reported by the host's scanner on a detection tick
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyObservation {
    pub name: String,
    /// Bearing relative to the agent's body heading, degrees
    pub bearing: f64,
    pub distance: f64,
    pub heading: f64,
    pub velocity: f64,
    pub energy: f64,
    pub time: Tick,
}

/// A bullet as the host reports it inside combat notifications
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub heading_radians: f64,
    pub x: f64,
    pub y: f64,
    pub power: f64,
    pub owner_name: String,
    pub victim_name: String,
    pub is_active: bool,
    pub bullet_id: i32,
}

/// Combat and collision notifications, one per host callback
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// Our bullet hit an opponent
    BulletHit {
        name: String,
        energy: f64,
        bullet: Bullet,
    },
    /// Our bullet collided with another bullet
    BulletHitBullet { bullet: Bullet, hit_bullet: Bullet },
    /// Our bullet left the battlefield
    BulletMissed { bullet: Bullet },
    /// We were hit
    HitByBullet { bearing: f64, bullet: Bullet },
    /// We collided with another robot
    HitRobot {
        robot_name: String,
        bearing: f64,
        energy: f64,
        at_fault: bool,
    },
    HitWall { bearing: f64 },
    /// Another robot died
    RobotDeath { robot_name: String },
}

/// Primitive command surface of the simulation host.
///
/// "Set" commands replace any pending command of the same kind; nothing takes
/// effect until `execute` commits the pending set for the current tick.
pub trait RobotHost {
    /// Fresh snapshot of the agent. Never cached by the bridge.
    fn agent_state(&self) -> AgentState;

    fn set_move(&mut self, direction: Direction, distance: f64);

    fn set_turn(&mut self, rotation: Rotation, degrees: f64);

    fn set_turn_gun(&mut self, rotation: Rotation, degrees: f64);

    fn set_turn_radar(&mut self, rotation: Rotation, degrees: f64);

    fn set_fire(&mut self, power: f64);

    /// Commit pending commands for this tick
    fn execute(&mut self);

    /// Keep the gun still while the body turns
    fn set_adjust_gun_for_body_turn(&mut self, _independent: bool) {}

    /// Keep the radar still while the gun turns
    fn set_adjust_radar_for_gun_turn(&mut self, _independent: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_signed() {
        assert_eq!(Rotation::from_signed(360.0), (Rotation::Right, 360.0));
        assert_eq!(Rotation::from_signed(-45.0), (Rotation::Left, 45.0));
        assert_eq!(Rotation::from_signed(0.0), (Rotation::Right, 0.0));
    }
}

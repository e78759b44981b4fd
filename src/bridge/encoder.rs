//! State encoder: agent snapshot + optional detection -> `GameState`
//!
//! Pure function of its inputs. Derived fields are computed from the
//! geometry passed in, never from a previous tick.

use crate::bridge::mapping::{enemy_fields, robot_state_fields};
use crate::core::types::normalize_relative_degrees;
use crate::host::{AgentState, EnemyObservation};
use crate::protocol::messages::{GameState, WireEnemy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateEncoder {
    wall_threshold: f64,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl StateEncoder {
    pub fn new(wall_threshold: f64) -> Self {
        Self { wall_threshold }
    }

    pub fn encode(&self, agent: &AgentState, enemy: Option<&EnemyObservation>) -> GameState {
        let mut robot_state = robot_state_fields(agent);
        robot_state.near_wall = is_near_wall(agent, self.wall_threshold);
        robot_state.gun_bearing = enemy.map(|e| gun_bearing(agent, e));

        GameState {
            robot_state,
            enemy: enemy.map(|e| encode_enemy(agent, e)),
        }
    }
}

/// True if any of the four walls is closer than `threshold`
pub fn is_near_wall(agent: &AgentState, threshold: f64) -> bool {
    let left = agent.x;
    let right = agent.battlefield_width - agent.x;
    let bottom = agent.y;
    let top = agent.battlefield_height - agent.y;
    left < threshold || right < threshold || bottom < threshold || top < threshold
}

/// Gun-relative bearing to the enemy in (-180, 180]
pub fn gun_bearing(agent: &AgentState, enemy: &EnemyObservation) -> f64 {
    let absolute = agent.heading + enemy.bearing;
    normalize_relative_degrees(absolute - agent.gun_heading)
}

fn encode_enemy(agent: &AgentState, enemy: &EnemyObservation) -> WireEnemy {
    let absolute = (agent.heading + enemy.bearing).to_radians();
    let x = agent.x + absolute.sin() * enemy.distance;
    let y = agent.y + absolute.cos() * enemy.distance;
    enemy_fields(enemy, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScriptedHost;

    fn agent() -> AgentState {
        *ScriptedHost::new(400.0, 400.0).state()
    }

    fn enemy(bearing: f64, distance: f64) -> EnemyObservation {
        EnemyObservation {
            name: "sample.Target".into(),
            bearing,
            distance,
            heading: 180.0,
            velocity: 8.0,
            energy: 100.0,
            time: 5,
        }
    }

    #[test]
    fn test_no_enemy_omits_target_fields() {
        let state = StateEncoder::default().encode(&agent(), None);
        assert!(state.enemy.is_none());
        assert!(state.robot_state.gun_bearing.is_none());
    }

    #[test]
    fn test_bearing_wraps_past_half_turn() {
        let mut a = agent();
        a.heading = 170.0;
        a.gun_heading = 0.0;
        let state = StateEncoder::default().encode(&a, Some(&enemy(30.0, 100.0)));
        assert_eq!(state.robot_state.gun_bearing, Some(-160.0));
    }

    #[test]
    fn test_gun_on_target_is_zero_not_absent() {
        let mut a = agent();
        a.heading = 90.0;
        a.gun_heading = 120.0;
        let state = StateEncoder::default().encode(&a, Some(&enemy(30.0, 100.0)));
        assert_eq!(state.robot_state.gun_bearing, Some(0.0));
    }

    #[test]
    fn test_near_wall_each_side() {
        let encoder = StateEncoder::new(50.0);
        let centre = agent();
        assert!(!encoder.encode(&centre, None).robot_state.near_wall);

        for (x, y) in [(49.0, 200.0), (351.0, 200.0), (200.0, 49.0), (200.0, 351.0)] {
            let mut a = centre;
            a.x = x;
            a.y = y;
            assert!(encoder.encode(&a, None).robot_state.near_wall, "({}, {})", x, y);
        }

        let mut edge = centre;
        edge.x = 50.0;
        assert!(!encoder.encode(&edge, None).robot_state.near_wall);
    }

    #[test]
    fn test_enemy_position_derived_from_bearing() {
        let a = agent(); // (200, 200) facing north
        let state = StateEncoder::default().encode(&a, Some(&enemy(90.0, 100.0)));
        let wire = state.enemy.unwrap();
        assert!((wire.x - 300.0).abs() < 1e-9);
        assert!((wire.y - 200.0).abs() < 1e-9);
        assert_eq!(wire.bearing, 90.0);
        assert_eq!(wire.distance, 100.0);
        assert_eq!(wire.time, 5);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = agent();
        let e = enemy(-45.0, 250.0);
        let encoder = StateEncoder::default();
        assert_eq!(encoder.encode(&a, Some(&e)), encoder.encode(&a, Some(&e)));
    }
}

//! Host -> wire field mapping
//!
//! Pure structural copies, one function per entity pair. Derived fields
//! (near-wall, gun bearing, enemy position) are the encoder's job.

use crate::core::types::Tick;
use crate::host::{AgentState, Bullet, CombatEvent, EnemyObservation};
use crate::protocol::messages::{WireBullet, WireEnemy, WireEvent, WireRobotState};

impl From<&Bullet> for WireBullet {
    fn from(b: &Bullet) -> Self {
        WireBullet {
            heading_radians: b.heading_radians,
            x: b.x,
            y: b.y,
            power: b.power,
            owner_name: b.owner_name.clone(),
            victim_name: b.victim_name.clone(),
            is_active: b.is_active,
            bullet_id: b.bullet_id,
        }
    }
}

impl From<&CombatEvent> for WireEvent {
    fn from(event: &CombatEvent) -> Self {
        match event {
            CombatEvent::BulletHit {
                name,
                energy,
                bullet,
            } => WireEvent::BulletHit {
                name: name.clone(),
                energy: *energy,
                bullet: bullet.into(),
            },
            CombatEvent::BulletHitBullet { bullet, hit_bullet } => WireEvent::BulletHitBullet {
                bullet: bullet.into(),
                hit_bullet: hit_bullet.into(),
            },
            CombatEvent::BulletMissed { bullet } => WireEvent::BulletMissed {
                bullet: bullet.into(),
            },
            CombatEvent::HitByBullet { bearing, bullet } => WireEvent::HitByBullet {
                bearing: *bearing,
                bullet: bullet.into(),
            },
            CombatEvent::HitRobot {
                robot_name,
                bearing,
                energy,
                at_fault,
            } => WireEvent::HitRobot {
                robot_name: robot_name.clone(),
                bearing: *bearing,
                energy: *energy,
                at_fault: *at_fault,
            },
            CombatEvent::HitWall { bearing } => WireEvent::HitWall { bearing: *bearing },
            CombatEvent::RobotDeath { robot_name } => WireEvent::RobotDeath {
                robot_name: robot_name.clone(),
            },
        }
    }
}

/// Ticks past `i64::MAX` saturate instead of wrapping negative
fn wire_tick(tick: Tick) -> i64 {
    i64::try_from(tick).unwrap_or(i64::MAX)
}

/// Copy the agent's native fields; derived fields start empty
pub fn robot_state_fields(agent: &AgentState) -> WireRobotState {
    WireRobotState {
        x: agent.x,
        y: agent.y,
        velocity: agent.velocity,
        heading: agent.heading,
        gun_heading: agent.gun_heading,
        radar_heading: agent.radar_heading,
        gun_heat: agent.gun_heat,
        gun_turn_remaining: agent.gun_turn_remaining,
        radar_turn_remaining: agent.radar_turn_remaining,
        energy: agent.energy,
        battle_field_width: agent.battlefield_width,
        battle_field_height: agent.battlefield_height,
        round_num: agent.round_num,
        time: wire_tick(agent.time),
        near_wall: false,
        gun_bearing: None,
    }
}

/// Copy the observation's native fields; `x`/`y` come from the caller
pub fn enemy_fields(enemy: &EnemyObservation, x: f64, y: f64) -> WireEnemy {
    WireEnemy {
        x,
        y,
        velocity: enemy.velocity,
        heading: enemy.heading,
        bearing: enemy.bearing,
        distance: enemy.distance,
        energy: enemy.energy,
        time: wire_tick(enemy.time),
    }
}

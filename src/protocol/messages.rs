//! Wire schema exchanged with the decision service.
//!
//! Every frame carries one JSON object. Requests are tagged by `rpc`,
//! replies by `status`:
//!
//! ```text
//! -> {"rpc":"start_round"}
//! <- {"status":"empty"}
//! -> {"rpc":"act","state":{"robot_state":{...},"enemy":{...}}}
//! <- {"status":"actions","actions":[{"action_type":"TURN_RIGHT","value":30.0}]}
//! -> {"rpc":"on_event","event":{"hit_wall":{"bearing":-90.0}}}
//! <- {"status":"empty"}
//! -> {"rpc":"end_round","result":{"reason":"WIN"}}
//! <- {"status":"empty"}
//! ```

use crate::core::error::{BridgeError, Result};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Game state (bridge -> service)
// ============================================================================

/// Controlled agent at one tick, plus the derived fields computed at encode
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRobotState {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub heading: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    pub gun_heat: f64,
    pub gun_turn_remaining: f64,
    pub radar_turn_remaining: f64,
    pub energy: f64,
    pub battle_field_width: f64,
    pub battle_field_height: f64,
    pub round_num: i32,
    pub time: i64,
    pub near_wall: bool,
    /// Gun-relative bearing to the detected enemy. Omitted, not zeroed, when
    /// no enemy accompanies the state: 0 means "gun points at the target".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gun_bearing: Option<f64>,
}

/// One detected opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEnemy {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub heading: f64,
    pub bearing: f64,
    pub distance: f64,
    pub energy: f64,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub robot_state: WireRobotState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy: Option<WireEnemy>,
}

// ============================================================================
// Combat events (bridge -> service, reply ignored)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBullet {
    pub heading_radians: f64,
    pub x: f64,
    pub y: f64,
    pub power: f64,
    pub owner_name: String,
    pub victim_name: String,
    pub is_active: bool,
    pub bullet_id: i32,
}

/// Exactly one variant per message, externally tagged by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireEvent {
    BulletHit {
        name: String,
        energy: f64,
        bullet: WireBullet,
    },
    BulletHitBullet {
        bullet: WireBullet,
        hit_bullet: WireBullet,
    },
    BulletMissed {
        bullet: WireBullet,
    },
    HitByBullet {
        bearing: f64,
        bullet: WireBullet,
    },
    HitRobot {
        robot_name: String,
        bearing: f64,
        energy: f64,
        at_fault: bool,
    },
    HitWall {
        bearing: f64,
    },
    RobotDeath {
        robot_name: String,
    },
}

impl WireEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WireEvent::BulletHit { .. } => "bullet_hit",
            WireEvent::BulletHitBullet { .. } => "bullet_hit_bullet",
            WireEvent::BulletMissed { .. } => "bullet_missed",
            WireEvent::HitByBullet { .. } => "hit_by_bullet",
            WireEvent::HitRobot { .. } => "hit_robot",
            WireEvent::HitWall { .. } => "hit_wall",
            WireEvent::RobotDeath { .. } => "robot_death",
        }
    }
}

// ============================================================================
// Round results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundReason {
    Unknown,
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub reason: RoundReason,
}

// ============================================================================
// Actions (service -> bridge)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    TurnGunLeft,
    TurnGunRight,
    Fire,
    RotateRadarLeft,
    RotateRadarRight,
    DoNothing,
    /// Any action type this bridge does not know; executed as a no-op
    #[serde(other)]
    Unknown,
}

/// One element of the ordered action list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionCommand {
    pub action_type: ActionType,
    /// Distance, degrees or fire power depending on `action_type`
    #[serde(default)]
    pub value: f64,
}

impl ActionCommand {
    pub fn new(action_type: ActionType, value: f64) -> Self {
        Self { action_type, value }
    }

    fn malformed() -> Self {
        Self {
            action_type: ActionType::Unknown,
            value: 0.0,
        }
    }
}

/// Decode an action list one element at a time so a single malformed entry
/// degrades to a no-op instead of failing the whole reply.
fn lenient_actions<'de, D>(deserializer: D) -> std::result::Result<Vec<ActionCommand>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| {
            serde_json::from_value::<ActionCommand>(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Malformed action in reply, treating as no-op");
                ActionCommand::malformed()
            })
        })
        .collect())
}

// ============================================================================
// Envelopes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rpc", rename_all = "snake_case")]
pub enum Request {
    StartRound,
    /// Drop any per-round state on the service without reporting an outcome
    ResetRound,
    Act { state: GameState },
    SendState { state: GameState },
    OnEvent { event: WireEvent },
    EndRound { result: RoundResult },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::StartRound => "start_round",
            Request::ResetRound => "reset_round",
            Request::Act { .. } => "act",
            Request::SendState { .. } => "send_state",
            Request::OnEvent { .. } => "on_event",
            Request::EndRound { .. } => "end_round",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Empty,
    Actions {
        #[serde(deserialize_with = "lenient_actions")]
        actions: Vec<ActionCommand>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl Reply {
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Empty => "empty",
            Reply::Actions { .. } => "actions",
            Reply::Error { .. } => "error",
        }
    }

    /// Turn an error reply into a `BridgeError::Remote`
    pub fn into_result(self) -> Result<Reply> {
        match self {
            Reply::Error { code, message } => Err(BridgeError::Remote { code, message }),
            other => Ok(other),
        }
    }
}

pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(request)?)
}

pub fn decode_request(payload: &[u8]) -> Result<Request> {
    Ok(serde_json::from_slice(payload)?)
}

pub fn encode_reply(reply: &Reply) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(reply)?)
}

pub fn decode_reply(payload: &[u8]) -> Result<Reply> {
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot_state() -> WireRobotState {
        WireRobotState {
            x: 100.0,
            y: 200.0,
            velocity: 0.0,
            heading: 90.0,
            gun_heading: 90.0,
            radar_heading: 90.0,
            gun_heat: 0.0,
            gun_turn_remaining: 0.0,
            radar_turn_remaining: 0.0,
            energy: 100.0,
            battle_field_width: 400.0,
            battle_field_height: 400.0,
            round_num: 0,
            time: 12,
            near_wall: false,
            gun_bearing: None,
        }
    }

    #[test]
    fn test_absent_enemy_is_omitted() {
        let request = Request::Act {
            state: GameState {
                robot_state: robot_state(),
                enemy: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["rpc"], "act");
        assert!(json["state"].get("enemy").is_none());
        assert!(json["state"]["robot_state"].get("gun_bearing").is_none());
    }

    #[test]
    fn test_zero_gun_bearing_is_kept() {
        let mut state = robot_state();
        state.gun_bearing = Some(0.0);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["gun_bearing"], 0.0);
    }

    #[test]
    fn test_event_is_externally_tagged() {
        let request = Request::OnEvent {
            event: WireEvent::HitWall { bearing: -90.0 },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"rpc":"on_event","event":{"hit_wall":{"bearing":-90.0}}}"#);
    }

    #[test]
    fn test_end_round_reason_spelling() {
        let request = Request::EndRound {
            result: RoundResult {
                reason: RoundReason::Win,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"rpc":"end_round","result":{"reason":"WIN"}}"#);
    }

    #[test]
    fn test_actions_reply_preserves_order() {
        let payload = br#"{"status":"actions","actions":[
            {"action_type":"TURN_RIGHT","value":30.0},
            {"action_type":"FIRE","value":2.0}
        ]}"#;
        let reply = decode_reply(payload).unwrap();
        assert_eq!(
            reply,
            Reply::Actions {
                actions: vec![
                    ActionCommand::new(ActionType::TurnRight, 30.0),
                    ActionCommand::new(ActionType::Fire, 2.0),
                ]
            }
        );
    }

    #[test]
    fn test_unknown_action_type_decodes_as_unknown() {
        let payload = br#"{"status":"actions","actions":[
            {"action_type":"SELF_DESTRUCT","value":1.0},
            {"action_type":"MOVE_FORWARD","value":50.0}
        ]}"#;
        let Reply::Actions { actions } = decode_reply(payload).unwrap() else {
            panic!("expected actions");
        };
        assert_eq!(actions[0].action_type, ActionType::Unknown);
        assert_eq!(actions[1], ActionCommand::new(ActionType::MoveForward, 50.0));
    }

    #[test]
    fn test_malformed_action_degrades_without_failing_batch() {
        let payload = br#"{"status":"actions","actions":[
            "garbage",
            {"value":3.0},
            {"action_type":"DO_NOTHING"},
            {"action_type":"FIRE","value":1.0}
        ]}"#;
        let Reply::Actions { actions } = decode_reply(payload).unwrap() else {
            panic!("expected actions");
        };
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0].action_type, ActionType::Unknown);
        assert_eq!(actions[1].action_type, ActionType::Unknown);
        assert_eq!(actions[2], ActionCommand::new(ActionType::DoNothing, 0.0));
        assert_eq!(actions[3], ActionCommand::new(ActionType::Fire, 1.0));
    }

    #[test]
    fn test_error_reply_into_result() {
        let reply = decode_reply(br#"{"status":"error","code":"UNAVAILABLE","message":"busy"}"#)
            .unwrap();
        let err = reply.into_result().unwrap_err();
        assert!(matches!(err, BridgeError::Remote { ref code, .. } if code == "UNAVAILABLE"));
    }

    #[test]
    fn test_request_decode_matches_encode() {
        let request = Request::ResetRound;
        let bytes = encode_request(&request).unwrap();
        assert_eq!(bytes, br#"{"rpc":"reset_round"}"#);
        assert_eq!(decode_request(&bytes).unwrap(), request);
    }
}

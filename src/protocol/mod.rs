//! Wire protocol spoken with the decision service: framing plus the JSON
//! message schema.

pub mod frame;
pub mod messages;

pub use frame::{read_frame, write_frame, MAX_FRAME_LEN};
pub use messages::{
    ActionCommand, ActionType, GameState, Reply, Request, RoundReason, RoundResult, WireBullet,
    WireEnemy, WireEvent, WireRobotState,
};

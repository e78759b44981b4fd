//! The bridge between the simulation host and the decision service
//!
//! Components, bottom-up:
//! - `channel`: one lazily opened connection, released with a bounded wait
//! - `service`: the RPC surface over that connection
//! - `encoder` / `mapping`: host snapshots and events to wire messages
//! - `events`, `lifecycle`, `decision`, `executor`: per-callback behaviour
//! - `controller`: the host-facing `RobotController` tying them together

pub mod channel;
pub mod controller;
pub mod decision;
pub mod encoder;
pub mod events;
pub mod executor;
pub mod lifecycle;
pub mod mapping;
pub mod service;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{ChannelManager, ReleaseOutcome};
pub use controller::{Bridge, BridgeStats, RobotController};
pub use decision::{DecisionLoop, DecisionStats};
pub use encoder::StateEncoder;
pub use events::EventForwarder;
pub use executor::{clamp_fire_power, ActionExecutor, ExecutionReport};
pub use lifecycle::{RoundLifecycle, RoundOutcome, RoundPhase};
pub use service::{DecisionEndpoint, DecisionService, RemoteService};
pub use trigger::{TriggerClock, TriggerPolicy, TriggerReason};

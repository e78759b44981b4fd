//! The decision service as seen by the bridge
//!
//! `DecisionService` is the seam between the bridge components and the
//! remote peer. `RemoteService` speaks the wire protocol over a
//! `ChannelManager`; tests substitute recording fakes.

use crate::bridge::channel::{ChannelManager, ReleaseOutcome};
use crate::core::config::ServiceConfig;
use crate::core::error::{BridgeError, Result};
use crate::protocol::messages::{
    ActionCommand, GameState, Reply, Request, RoundReason, RoundResult, WireEvent,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which RPC carries game state to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionEndpoint {
    #[default]
    Act,
    SendState,
}

pub trait DecisionService {
    /// Open the connection if it is not already open
    fn ensure_connected(&mut self) -> Result<()>;

    /// Tear the connection down with a bounded wait. Never fails.
    fn release(&mut self) -> ReleaseOutcome;

    fn start_round(&mut self) -> Result<()>;

    /// Ask the service to drop per-round state without reporting an outcome
    fn reset_round(&mut self) -> Result<()>;

    /// Submit state and receive the ordered action list
    fn decide(&mut self, endpoint: DecisionEndpoint, state: GameState)
        -> Result<Vec<ActionCommand>>;

    /// One-way event delivery; the acknowledgement carries nothing
    fn on_event(&mut self, event: WireEvent) -> Result<()>;

    fn end_round(&mut self, reason: RoundReason) -> Result<()>;

    /// Connections opened so far, for diagnostics
    fn connections_opened(&self) -> u64 {
        0
    }
}

pub struct RemoteService {
    channel: ChannelManager,
    release_timeout: Duration,
}

impl RemoteService {
    pub fn new(channel: ChannelManager, release_timeout: Duration) -> Self {
        Self {
            channel,
            release_timeout,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(ChannelManager::from_config(config), config.release_timeout())
    }

    pub fn channel(&self) -> &ChannelManager {
        &self.channel
    }

    fn expect_empty(&mut self, request: Request) -> Result<()> {
        match self.channel.call(&request)? {
            Reply::Empty => Ok(()),
            other => Err(BridgeError::UnexpectedReply {
                expected: "empty",
                got: other.kind(),
            }),
        }
    }
}

impl DecisionService for RemoteService {
    fn ensure_connected(&mut self) -> Result<()> {
        self.channel.ensure_connected()
    }

    fn release(&mut self) -> ReleaseOutcome {
        self.channel.release(self.release_timeout)
    }

    fn start_round(&mut self) -> Result<()> {
        self.expect_empty(Request::StartRound)
    }

    fn reset_round(&mut self) -> Result<()> {
        self.expect_empty(Request::ResetRound)
    }

    fn decide(
        &mut self,
        endpoint: DecisionEndpoint,
        state: GameState,
    ) -> Result<Vec<ActionCommand>> {
        let request = match endpoint {
            DecisionEndpoint::Act => Request::Act { state },
            DecisionEndpoint::SendState => Request::SendState { state },
        };
        match self.channel.call(&request)? {
            Reply::Actions { actions } => Ok(actions),
            // Nothing to do this tick
            Reply::Empty => Ok(Vec::new()),
            other => Err(BridgeError::UnexpectedReply {
                expected: "actions",
                got: other.kind(),
            }),
        }
    }

    fn on_event(&mut self, event: WireEvent) -> Result<()> {
        self.channel.call(&Request::OnEvent { event }).map(|_| ())
    }

    fn end_round(&mut self, reason: RoundReason) -> Result<()> {
        self.expect_empty(Request::EndRound {
            result: RoundResult { reason },
        })
    }

    fn connections_opened(&self) -> u64 {
        self.channel.connections_opened()
    }
}

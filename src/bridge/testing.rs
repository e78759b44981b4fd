//! Recording fake of the decision service for unit tests

use crate::bridge::channel::ReleaseOutcome;
use crate::bridge::service::{DecisionEndpoint, DecisionService};
use crate::core::error::{BridgeError, Result};
use crate::protocol::messages::{ActionCommand, GameState, RoundReason, WireEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect,
    Release,
    StartRound,
    ResetRound,
    Decide(DecisionEndpoint, GameState),
    Event(WireEvent),
    EndRound(RoundReason),
}

#[derive(Default)]
pub struct RecordingService {
    pub calls: Vec<Call>,
    /// Returned by every successful `decide`
    pub actions: Vec<ActionCommand>,
    /// Make `decide` fail with a transport error
    pub fail_decide: bool,
    /// Make every RPC fail with a transport error
    pub fail_all: bool,
    connected: bool,
    opened: u64,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(actions: Vec<ActionCommand>) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    pub fn decide_calls(&self) -> Vec<&GameState> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Decide(_, state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn refused() -> BridgeError {
        BridgeError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
    }

    /// Connect first, then record, in the order a real channel talks.
    /// Failed attempts are still recorded.
    fn rpc(&mut self, call: Call) -> Result<()> {
        if self.fail_all {
            self.calls.push(call);
            return Err(Self::refused());
        }
        self.ensure_connected()?;
        self.calls.push(call);
        Ok(())
    }
}

impl DecisionService for RecordingService {
    fn ensure_connected(&mut self) -> Result<()> {
        if self.fail_all {
            return Err(Self::refused());
        }
        if !self.connected {
            self.calls.push(Call::Connect);
            self.connected = true;
            self.opened += 1;
        }
        Ok(())
    }

    fn release(&mut self) -> ReleaseOutcome {
        self.calls.push(Call::Release);
        if std::mem::replace(&mut self.connected, false) {
            ReleaseOutcome::Graceful
        } else {
            ReleaseOutcome::Idle
        }
    }

    fn start_round(&mut self) -> Result<()> {
        self.rpc(Call::StartRound)
    }

    fn reset_round(&mut self) -> Result<()> {
        self.rpc(Call::ResetRound)
    }

    fn decide(
        &mut self,
        endpoint: DecisionEndpoint,
        state: GameState,
    ) -> Result<Vec<ActionCommand>> {
        self.rpc(Call::Decide(endpoint, state))?;
        if self.fail_decide {
            return Err(BridgeError::Timeout);
        }
        Ok(self.actions.clone())
    }

    fn on_event(&mut self, event: WireEvent) -> Result<()> {
        self.rpc(Call::Event(event))
    }

    fn end_round(&mut self, reason: RoundReason) -> Result<()> {
        self.rpc(Call::EndRound(reason))
    }

    fn connections_opened(&self) -> u64 {
        self.opened
    }
}

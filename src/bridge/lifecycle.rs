//! Round lifecycle: NotStarted -> Active -> Ended
//!
//! Carries the round outcome to the service exactly once. The outcome is
//! latched by the first terminal callback; later ones are ignored.

use crate::bridge::channel::ReleaseOutcome;
use crate::bridge::service::DecisionService;
use crate::protocol::messages::RoundReason;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    NotStarted,
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Unknown,
    Win,
    Loss,
}

impl RoundOutcome {
    pub fn reason(self) -> RoundReason {
        match self {
            RoundOutcome::Unknown => RoundReason::Unknown,
            RoundOutcome::Win => RoundReason::Win,
            RoundOutcome::Loss => RoundReason::Loss,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundLifecycle {
    phase: RoundPhase,
    outcome: RoundOutcome,
    skipped_ticks: u64,
    rounds_started: u64,
}

impl Default for RoundLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundLifecycle {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::NotStarted,
            outcome: RoundOutcome::Unknown,
            skipped_ticks: 0,
            rounds_started: 0,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn outcome(&self) -> RoundOutcome {
        self.outcome
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    pub fn rounds_started(&self) -> u64 {
        self.rounds_started
    }

    /// Start a round: connect, optionally reset leftover service state, then
    /// signal the start. Remote failures are logged and the round goes
    /// active anyway.
    pub fn begin(&mut self, service: &mut dyn DecisionService, reset_first: bool) {
        if self.phase == RoundPhase::Active {
            tracing::warn!("Round already active, ignoring start");
            return;
        }

        self.phase = RoundPhase::Active;
        self.outcome = RoundOutcome::Unknown;
        self.rounds_started += 1;

        if let Err(e) = service.ensure_connected() {
            tracing::error!(error = %e, "Could not connect to decision service");
        }
        if reset_first {
            match service.reset_round() {
                Ok(()) => tracing::debug!("Round state reset on decision service"),
                Err(e) => tracing::error!(error = %e, "Error resetting round state"),
            }
        }
        match service.start_round() {
            Ok(()) => tracing::info!(round = self.rounds_started, "Round started"),
            Err(e) => tracing::error!(error = %e, "Error starting round"),
        }
    }

    /// Latch a terminal outcome. Returns false if one was already latched or
    /// no round is active.
    pub fn record_outcome(&mut self, outcome: RoundOutcome) -> bool {
        if self.phase != RoundPhase::Active {
            tracing::debug!(?outcome, phase = ?self.phase, "No active round, outcome ignored");
            return false;
        }
        if self.outcome != RoundOutcome::Unknown {
            tracing::debug!(
                latched = ?self.outcome,
                ignored = ?outcome,
                "Outcome already latched"
            );
            return false;
        }
        self.outcome = outcome;
        match outcome {
            RoundOutcome::Win => tracing::info!("Round won!"),
            RoundOutcome::Loss => tracing::info!("Round lost."),
            RoundOutcome::Unknown => {}
        }
        true
    }

    pub fn note_skipped_tick(&mut self) {
        self.skipped_ticks += 1;
        tracing::info!(skipped = self.skipped_ticks, "Skipped tick");
    }

    /// End the round: deliver the latched outcome, then release the channel
    /// if asked. Only the first call per round does anything.
    pub fn finish(
        &mut self,
        service: &mut dyn DecisionService,
        release: bool,
    ) -> Option<ReleaseOutcome> {
        if self.phase != RoundPhase::Active {
            tracing::debug!(phase = ?self.phase, "Round not active, ignoring end");
            return None;
        }
        self.phase = RoundPhase::Ended;

        tracing::info!(outcome = ?self.outcome, "Round ended");
        if let Err(e) = service.end_round(self.outcome.reason()) {
            tracing::error!(error = %e, "Error ending round");
        }

        if release {
            Some(service.release())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::{Call, RecordingService};

    #[test]
    fn test_begin_resets_then_starts() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, true);

        assert_eq!(lifecycle.phase(), RoundPhase::Active);
        assert_eq!(
            service.calls,
            vec![Call::Connect, Call::ResetRound, Call::StartRound]
        );
    }

    #[test]
    fn test_begin_without_reset() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, false);
        assert_eq!(service.calls, vec![Call::Connect, Call::StartRound]);
    }

    #[test]
    fn test_begin_survives_remote_failure() {
        let mut service = RecordingService::new();
        service.fail_all = true;
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, true);
        assert_eq!(lifecycle.phase(), RoundPhase::Active);
    }

    #[test]
    fn test_outcome_is_write_once() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, false);

        assert!(lifecycle.record_outcome(RoundOutcome::Win));
        assert!(!lifecycle.record_outcome(RoundOutcome::Loss));
        assert_eq!(lifecycle.outcome(), RoundOutcome::Win);
    }

    #[test]
    fn test_outcome_ignored_before_start() {
        let mut lifecycle = RoundLifecycle::new();
        assert!(!lifecycle.record_outcome(RoundOutcome::Loss));
        assert_eq!(lifecycle.outcome(), RoundOutcome::Unknown);
    }

    #[test]
    fn test_finish_sends_outcome_once_then_releases() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, false);
        lifecycle.record_outcome(RoundOutcome::Loss);

        let released = lifecycle.finish(&mut service, true);
        assert_eq!(released, Some(ReleaseOutcome::Graceful));
        assert_eq!(lifecycle.finish(&mut service, true), None);

        assert_eq!(
            service.count(|c| matches!(c, Call::EndRound(_))),
            1,
            "end_round must be sent exactly once"
        );
        let end = service
            .calls
            .iter()
            .position(|c| *c == Call::EndRound(RoundReason::Loss))
            .unwrap();
        let release = service.calls.iter().position(|c| *c == Call::Release).unwrap();
        assert!(end < release, "outcome must precede teardown");
    }

    #[test]
    fn test_finish_without_terminal_callback_sends_unknown() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, false);
        assert_eq!(lifecycle.finish(&mut service, false), None);
        assert!(service.calls.contains(&Call::EndRound(RoundReason::Unknown)));
        assert!(!service.calls.contains(&Call::Release));
    }

    #[test]
    fn test_skipped_ticks_do_not_change_phase() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, false);
        lifecycle.note_skipped_tick();
        lifecycle.note_skipped_tick();
        assert_eq!(lifecycle.skipped_ticks(), 2);
        assert_eq!(lifecycle.phase(), RoundPhase::Active);
    }

    #[test]
    fn test_next_round_starts_fresh() {
        let mut service = RecordingService::new();
        let mut lifecycle = RoundLifecycle::new();
        lifecycle.begin(&mut service, false);
        lifecycle.record_outcome(RoundOutcome::Win);
        lifecycle.finish(&mut service, true);

        lifecycle.begin(&mut service, false);
        assert_eq!(lifecycle.outcome(), RoundOutcome::Unknown);
        assert_eq!(lifecycle.rounds_started(), 2);
        assert!(lifecycle.record_outcome(RoundOutcome::Loss));
    }
}

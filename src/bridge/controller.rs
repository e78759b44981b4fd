//! Bridge controller - the host's callback surface
//!
//! One parameterized controller replaces per-variant robot classes: the
//! trigger policy, endpoint and teardown behaviour all come from config.

use serde::Serialize;

use crate::bridge::channel::ReleaseOutcome;
use crate::bridge::decision::{DecisionLoop, DecisionStats};
use crate::bridge::events::EventForwarder;
use crate::bridge::lifecycle::{RoundLifecycle, RoundOutcome, RoundPhase};
use crate::bridge::service::{DecisionService, RemoteService};
use crate::core::config::BridgeConfig;
use crate::core::error::Result;
use crate::host::{CombatEvent, EnemyObservation, RobotHost};

/// Callbacks the simulation host invokes on its control thread
pub trait RobotController {
    /// Round initialization, before the first tick
    fn on_start(&mut self, host: &mut dyn RobotHost);

    /// Once per tick, after any detection and combat callbacks
    fn on_tick(&mut self, host: &mut dyn RobotHost);

    /// The scanner reported an opponent this tick
    fn on_detect(&mut self, host: &mut dyn RobotHost, enemy: &EnemyObservation);

    fn on_combat_event(&mut self, event: &CombatEvent);

    fn on_round_won(&mut self);

    fn on_round_lost(&mut self);

    /// Final callback of a round
    fn on_round_ended(&mut self);

    /// The host dropped a tick because the previous one overran
    fn on_tick_skipped(&mut self);
}

/// Counters across the bridge's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BridgeStats {
    pub rounds_started: u64,
    pub outcome: RoundOutcome,
    pub decisions: DecisionStats,
    pub events_forwarded: u64,
    pub events_failed: u64,
    pub skipped_ticks: u64,
    pub connections_opened: u64,
}

pub struct Bridge<S: DecisionService> {
    service: S,
    lifecycle: RoundLifecycle,
    decision: DecisionLoop,
    events: EventForwarder,
    reset_on_start: bool,
    release_on_round_end: bool,
}

impl Bridge<RemoteService> {
    /// Bridge talking to the configured remote service. No connection is
    /// made until the round starts.
    pub fn remote(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config, RemoteService::from_config(&config.service)))
    }
}

impl<S: DecisionService> Bridge<S> {
    pub fn new(config: &BridgeConfig, service: S) -> Self {
        tracing::debug!(
            trigger = ?config.decision.trigger,
            interval = config.decision.interval_ticks,
            endpoint = ?config.decision.endpoint,
            "Bridge configured"
        );
        Self {
            service,
            lifecycle: RoundLifecycle::new(),
            decision: DecisionLoop::from_config(config),
            events: EventForwarder::new(),
            reset_on_start: config.lifecycle.reset_on_start,
            release_on_round_end: config.lifecycle.release_on_round_end,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn lifecycle(&self) -> &RoundLifecycle {
        &self.lifecycle
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            rounds_started: self.lifecycle.rounds_started(),
            outcome: self.lifecycle.outcome(),
            decisions: self.decision.stats(),
            events_forwarded: self.events.forwarded(),
            events_failed: self.events.failed(),
            skipped_ticks: self.lifecycle.skipped_ticks(),
            connections_opened: self.service.connections_opened(),
        }
    }

    /// Release the channel at process end. Safe to call repeatedly.
    pub fn shutdown(&mut self) -> ReleaseOutcome {
        let outcome = self.service.release();
        tracing::info!(?outcome, "Bridge shut down");
        outcome
    }

    fn is_active(&self) -> bool {
        self.lifecycle.phase() == RoundPhase::Active
    }
}

impl<S: DecisionService> RobotController for Bridge<S> {
    fn on_start(&mut self, host: &mut dyn RobotHost) {
        // Body, gun and radar turn independently
        host.set_adjust_gun_for_body_turn(true);
        host.set_adjust_radar_for_gun_turn(true);

        self.decision.reset_clock(host.agent_state().time);
        self.lifecycle.begin(&mut self.service, self.reset_on_start);
    }

    fn on_tick(&mut self, host: &mut dyn RobotHost) {
        if !self.is_active() {
            return;
        }
        self.decision.on_tick(host, &mut self.service);
        host.execute();
    }

    fn on_detect(&mut self, host: &mut dyn RobotHost, enemy: &EnemyObservation) {
        if !self.is_active() {
            return;
        }
        tracing::trace!(enemy = %enemy.name, distance = enemy.distance, "Enemy detected");
        self.decision.on_detect(host, &mut self.service, enemy);
    }

    fn on_combat_event(&mut self, event: &CombatEvent) {
        self.events.forward(&mut self.service, event);
    }

    fn on_round_won(&mut self) {
        self.lifecycle.record_outcome(RoundOutcome::Win);
    }

    fn on_round_lost(&mut self) {
        self.lifecycle.record_outcome(RoundOutcome::Loss);
    }

    fn on_round_ended(&mut self) {
        if let Some(outcome) = self
            .lifecycle
            .finish(&mut self.service, self.release_on_round_end)
        {
            tracing::info!(?outcome, "Channel released after round");
        }
    }

    fn on_tick_skipped(&mut self) {
        self.lifecycle.note_skipped_tick();
    }
}

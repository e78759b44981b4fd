//! Decision loop - per-tick driver
//!
//! Sweeps the radar every tick, asks the trigger clock whether the service
//! should be consulted, and hands any returned actions to the executor.

use serde::Serialize;

use crate::bridge::encoder::StateEncoder;
use crate::bridge::executor::ActionExecutor;
use crate::bridge::service::{DecisionEndpoint, DecisionService};
use crate::bridge::trigger::{TriggerClock, TriggerReason};
use crate::core::config::BridgeConfig;
use crate::core::types::Tick;
use crate::host::{EnemyObservation, RobotHost, Rotation};

/// Decision counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecisionStats {
    pub requested: u64,
    pub failed: u64,
    pub applied: u64,
    pub idle: u64,
    pub ignored: u64,
}

pub struct DecisionLoop {
    clock: TriggerClock,
    encoder: StateEncoder,
    executor: ActionExecutor,
    endpoint: DecisionEndpoint,
    /// Signed degrees, positive = clockwise; 0 disables the sweep
    radar_sweep: f64,
    stats: DecisionStats,
}

impl DecisionLoop {
    pub fn new(
        clock: TriggerClock,
        encoder: StateEncoder,
        executor: ActionExecutor,
        endpoint: DecisionEndpoint,
        radar_sweep: f64,
    ) -> Self {
        Self {
            clock,
            encoder,
            executor,
            endpoint,
            radar_sweep,
            stats: DecisionStats::default(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        let decision = &config.decision;
        Self::new(
            TriggerClock::new(decision.trigger, decision.interval_ticks),
            StateEncoder::new(config.geometry.wall_threshold),
            ActionExecutor::new(decision.commit_each_command),
            decision.endpoint,
            decision.radar_sweep_degrees,
        )
    }

    pub fn clock(&self) -> &TriggerClock {
        &self.clock
    }

    pub fn stats(&self) -> DecisionStats {
        self.stats
    }

    /// Restart the periodic countdown, e.g. at round start
    pub fn reset_clock(&mut self, tick: Tick) {
        self.clock.reset(tick);
    }

    /// Issue the continuous radar sweep for this tick
    pub fn sweep_radar(&self, host: &mut dyn RobotHost) {
        if self.radar_sweep == 0.0 {
            return;
        }
        let (rotation, degrees) = Rotation::from_signed(self.radar_sweep);
        host.set_turn_radar(rotation, degrees);
    }

    /// Host reported a detection this tick
    pub fn on_detect(
        &mut self,
        host: &mut dyn RobotHost,
        service: &mut dyn DecisionService,
        enemy: &EnemyObservation,
    ) -> bool {
        match self.clock.on_detection() {
            Some(reason) => self.decide(host, service, Some(enemy), reason),
            None => false,
        }
    }

    /// Regular tick hook: radar sweep, then the periodic check.
    /// Returns whether a decision call was made.
    pub fn on_tick(&mut self, host: &mut dyn RobotHost, service: &mut dyn DecisionService) -> bool {
        self.sweep_radar(host);
        let now = host.agent_state().time;
        match self.clock.on_tick(now) {
            Some(reason) => self.decide(host, service, None, reason),
            None => false,
        }
    }

    /// Encode, call, execute. A failed call skips execution for this tick.
    fn decide(
        &mut self,
        host: &mut dyn RobotHost,
        service: &mut dyn DecisionService,
        enemy: Option<&EnemyObservation>,
        reason: TriggerReason,
    ) -> bool {
        let agent = host.agent_state();
        // The countdown restarts on every triggered call, failed or not
        self.clock.mark_fired(agent.time);
        self.stats.requested += 1;

        let state = self.encoder.encode(&agent, enemy);
        tracing::debug!(tick = agent.time, ?reason, endpoint = ?self.endpoint, "Requesting decision");

        match service.decide(self.endpoint, state) {
            Ok(actions) => {
                let report = self.executor.apply(host, &actions);
                self.stats.applied += report.applied as u64;
                self.stats.idle += report.idle as u64;
                self.stats.ignored += report.ignored as u64;
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::error!(tick = agent.time, ?reason, error = %e, "Error getting action");
            }
        }
        true
    }
}

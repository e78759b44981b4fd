//! Trigger policies: which ticks consult the decision service
//!
//! Reactive fires on a detection, periodic fires once `interval` ticks have
//! passed since the last call. Every call, whichever policy fired it,
//! restarts the periodic countdown, so `Both` never double-fires.

use crate::core::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    Reactive,
    Periodic,
    #[default]
    Both,
}

impl TriggerPolicy {
    pub fn reacts(self) -> bool {
        matches!(self, TriggerPolicy::Reactive | TriggerPolicy::Both)
    }

    pub fn polls(self) -> bool {
        matches!(self, TriggerPolicy::Periodic | TriggerPolicy::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    Detection,
    Interval,
}

#[derive(Debug, Clone, Copy)]
pub struct TriggerClock {
    policy: TriggerPolicy,
    interval: Tick,
    last_fired: Tick,
}

impl TriggerClock {
    pub fn new(policy: TriggerPolicy, interval: Tick) -> Self {
        Self {
            policy,
            interval: interval.max(1),
            last_fired: 0,
        }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Tick of the last triggered call (or the round start)
    pub fn last_fired(&self) -> Tick {
        self.last_fired
    }

    /// Restart the countdown from `tick`, e.g. at round start
    pub fn reset(&mut self, tick: Tick) {
        self.last_fired = tick;
    }

    /// Does a detection this tick trigger a call?
    pub fn on_detection(&self) -> Option<TriggerReason> {
        self.policy.reacts().then_some(TriggerReason::Detection)
    }

    /// Is the periodic call due at `now`?
    pub fn on_tick(&self, now: Tick) -> Option<TriggerReason> {
        (self.policy.polls() && now.saturating_sub(self.last_fired) >= self.interval)
            .then_some(TriggerReason::Interval)
    }

    pub fn mark_fired(&mut self, now: Tick) {
        self.last_fired = now;
    }
}

//! Power policy state.

use super::config::PolicyConfig;
use super::constraints::ConstraintRegistry;
use super::notify::NotifyRegistry;
use super::policy::{Outcome, StandbyPolicy, WfiPolicy};
use super::{Hardware, Scheduler};

/// Policy run from the idle hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Standby when the budget allows it, idle otherwise.
    Standby,
    /// Idle only.
    WfiOnly,
}

/// Counters kept across policy invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub standby: u32,
    pub idle: u32,
    pub aborted: u32,
    pub skipped: u32,
    /// Longest standby in RTOS ticks.
    pub longest_standby_ticks: u32,
}

impl Stats {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Aborted => self.aborted = self.aborted.wrapping_add(1),
            Outcome::Skipped => self.skipped = self.skipped.wrapping_add(1),
            Outcome::Idle => self.idle = self.idle.wrapping_add(1),
            Outcome::Standby { slept_ticks } => {
                self.standby = self.standby.wrapping_add(1);
                self.longest_standby_ticks = self.longest_standby_ticks.max(slept_ticks);
            }
        }
    }
}

/// State shared between the idle hook and the active policy.
pub struct PowerContext<'a, const N: usize> {
    pub(crate) config: PolicyConfig,
    pub(crate) constraints: &'a ConstraintRegistry,
    pub(crate) notify: &'a NotifyRegistry<N>,
    pub(crate) stats: Stats,
    idle_time_os: u32,
    policy: Policy,
    enabled: bool,
}

impl<'a, const N: usize> PowerContext<'a, N> {
    pub const fn new(
        config: PolicyConfig,
        constraints: &'a ConstraintRegistry,
        notify: &'a NotifyRegistry<N>,
    ) -> Self {
        Self {
            config,
            constraints,
            notify,
            stats: Stats {
                standby: 0,
                idle: 0,
                aborted: 0,
                skipped: 0,
                longest_standby_ticks: 0,
            },
            idle_time_os: 0,
            policy: Policy::Standby,
            enabled: true,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    pub fn enable_policy(&mut self) {
        self.enabled = true;
    }

    pub fn disable_policy(&mut self) {
        self.enabled = false;
    }

    pub fn is_policy_enabled(&self) -> bool {
        self.enabled
    }

    /// RTOS ticks the scheduler expects to stay idle for.
    pub fn idle_time_os(&self) -> u32 {
        self.idle_time_os
    }

    pub(crate) fn set_idle_time_os(&mut self, ticks: u32) {
        self.idle_time_os = ticks;
    }

    /// Run the active policy if it is enabled.
    pub fn idle_func<H, S>(&mut self, hw: &H, os: &S) -> Option<Outcome>
    where
        H: Hardware + ?Sized,
        S: Scheduler + ?Sized,
    {
        if !self.enabled {
            return None;
        }

        Some(match self.policy {
            Policy::Standby => StandbyPolicy::run(self, hw, os),
            Policy::WfiOnly => WfiPolicy::run(self, hw),
        })
    }
}

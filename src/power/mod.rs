//! Tickless idle power management
//!
//! When the RTOS has nothing to run it hands the expected idle time to
//! [`idle::suppress_ticks_and_sleep`]. The active policy then either waits
//! for an interrupt or puts the device in standby until the soonest timer
//! deadline, keeping the RTOS tick count in step with real time.

pub mod budget;
pub mod config;
pub mod constraints;
pub mod context;
pub mod idle;
pub mod notify;
pub mod policy;
pub mod reconcile;

pub use config::PolicyConfig;
pub use constraints::{Constraint, ConstraintRegistry};
pub use context::{Policy, PowerContext, Stats};
pub use notify::{NotifyRegistry, NotifyStatus, PowerEvent};
pub use policy::Outcome;

use crate::chip::Interrupt;
use crate::ckmd::LfClockStatus;
use crate::evtsvt::EventRouting;
use crate::rtc::RtcAccess;
use crate::systick::TickGenerator;
use crate::systim::SysTimerAccess;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    InvalidInput,
    RegistryFull,
    NotRegistered,
    NotifyFailed,
}

/// Answer of the scheduler when asked whether sleeping is still fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepModeStatus {
    /// A task became ready or a tick is pending. Do not sleep.
    Abort,
    Standard,
    /// No task is waiting on a timeout.
    NoTasksWaitingTimeout,
}

/// The hooks the policy needs from the RTOS.
pub trait Scheduler {
    /// Called with interrupts disabled.
    fn confirm_sleep_mode_status(&self) -> SleepModeStatus;

    /// Stop task switching.
    fn suspend_all(&self);

    /// Resume task switching. Interrupts are enabled on return.
    fn resume_all(&self);

    /// Advance the tick count by `ticks` at once.
    fn step_tick(&self, ticks: u32);
}

/// PRIMASK state saved when interrupts were disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptKey {
    was_enabled: bool,
}

impl InterruptKey {
    pub const fn new(was_enabled: bool) -> Self {
        Self { was_enabled }
    }

    pub const fn was_enabled(self) -> bool {
        self.was_enabled
    }

    /// Put the interrupt enable state back to what it was when the key was
    /// taken, whatever happened in between.
    pub fn restore_with(self, enable: impl FnOnce(), disable: impl FnOnce()) {
        if self.was_enabled {
            enable()
        } else {
            disable()
        }
    }
}

/// Everything the standby policy touches on the device.
pub trait Hardware:
    SysTimerAccess + RtcAccess + EventRouting + LfClockStatus + TickGenerator
{
    /// Disable interrupts and return the previous state.
    fn disable_interrupts(&self) -> InterruptKey;

    fn restore_interrupts(&self, key: InterruptKey);

    /// Clear a pending interrupt in the NVIC.
    fn clear_pending(&self, interrupt: Interrupt);

    /// Wait for interrupt in the current sleep mode.
    fn wait_for_interrupt(&self);

    /// Halt in standby until a wakeup event.
    fn enter_standby(&self);

    /// Reassert the clocks of peripherals that lost them in standby.
    fn apply_clock_dependencies(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    Idle,
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    /// From wakeup until running again.
    Resume,
    /// Enter and leave.
    Total,
}

/// Transition latency of `state` in us.
pub const fn transition_latency(state: SleepState, latency: Latency) -> u32 {
    match (state, latency) {
        (SleepState::Standby, Latency::Resume) => config::RESUME_TIME_STANDBY_US,
        (SleepState::Standby, Latency::Total) => config::TOTAL_TIME_STANDBY_US,
        (SleepState::Idle, _) => 0,
    }
}

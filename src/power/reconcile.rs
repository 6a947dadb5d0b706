//! Tick reconciliation
//!
//! While the device is in standby the RTOS tick is not running. The time spent
//! is measured on the SysTimer and converted to whole RTOS ticks, which are then
//! stepped into the kernel tick count in one go.

use super::config::PolicyConfig;
use super::Scheduler;

/// Divide by 1000 using a multiply and a shift.
///
/// 0x10624DD3 is 2^38 / 1000 rounded up. The rounding error stays below one
/// for any 32-bit numerator, so this is exact over the whole `u32` range.
#[inline]
pub const fn divide_by_1000(value: u32) -> u32 {
    ((value as u64 * 0x1062_4DD3) >> 38) as u32
}

/// How elapsed microseconds are turned into RTOS ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDivision {
    /// 1 ms tick period, divided with [`divide_by_1000`].
    By1000,
    /// Any other tick period in us.
    General(u32),
}

impl TickDivision {
    pub const fn for_period(tick_period_us: u32) -> Self {
        if tick_period_us == 1_000 {
            TickDivision::By1000
        } else {
            TickDivision::General(tick_period_us)
        }
    }

    #[inline]
    pub const fn ticks(self, elapsed_us: u32) -> u32 {
        match self {
            TickDivision::By1000 => divide_by_1000(elapsed_us),
            TickDivision::General(period) => elapsed_us / period,
        }
    }
}

/// Converts SysTimer time spent in standby into RTOS ticks.
#[derive(Debug, Clone, Copy)]
pub struct TickReconciler {
    clock_divider: u32,
    division: TickDivision,
}

impl TickReconciler {
    pub const fn new(config: &PolicyConfig) -> Self {
        Self {
            clock_divider: config.clock_divider(),
            division: config.tick_division(),
        }
    }

    /// Real time between two SysTimer 1us readings.
    #[inline]
    pub const fn elapsed_us(&self, before: u32, after: u32) -> u32 {
        after.wrapping_sub(before).wrapping_mul(self.clock_divider)
    }

    /// Whole RTOS ticks between two SysTimer 1us readings. The remainder is
    /// dropped.
    #[inline]
    pub const fn elapsed_ticks(&self, before: u32, after: u32) -> u32 {
        self.division.ticks(self.elapsed_us(before, after))
    }

    /// Advance the kernel tick count by the time spent between `before` and
    /// `after`. Returns the number of ticks stepped.
    pub fn step<S: Scheduler + ?Sized>(&self, os: &S, before: u32, after: u32) -> u32 {
        let ticks = self.elapsed_ticks(before, after);
        os.step_tick(ticks);
        ticks
    }
}

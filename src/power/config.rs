//! Build time configuration of the power policy.

use super::reconcile::TickDivision;

/// Total time to enter and leave standby, in us. Sleeping for less than this
/// is not worth it.
pub const TOTAL_TIME_STANDBY_US: u32 = 500;

/// Time from wakeup until the device is running again, in us.
pub const RESUME_TIME_STANDBY_US: u32 = 400;

/// How much earlier than the soonest timeout the RTC wakes the device, in us.
pub const WAKE_DELAY_STANDBY_US: u32 = 185;

/// CPU clock the tick conversions are calibrated for.
pub const NOMINAL_CPU_CLOCK_HZ: u32 = 48_000_000;

#[cfg(not(feature = "fpga"))]
pub const DEFAULT_CPU_CLOCK_HZ: u32 = NOMINAL_CPU_CLOCK_HZ;
#[cfg(feature = "fpga")]
pub const DEFAULT_CPU_CLOCK_HZ: u32 = NOMINAL_CPU_CLOCK_HZ / 2;

pub const DEFAULT_TICK_RATE_HZ: u32 = 1_000;

/// Longest SysTick period in CPU cycles.
pub const MAX_SYSTICK_PERIOD: u32 = 1 << 24;

/// Power policy configuration.
///
/// Every derived value is computed once here so that the policy itself only
/// reads fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    cpu_clock_hz: u32,
    tick_rate_hz: u32,
    tick_period_us: u32,
    clock_divider: u32,
    tick_division: TickDivision,
}

impl PolicyConfig {
    /// Create a configuration for an RTOS ticking at `tick_rate_hz` on a CPU
    /// clocked at `cpu_clock_hz`.
    pub const fn new(cpu_clock_hz: u32, tick_rate_hz: u32) -> Self {
        assert!(tick_rate_hz > 0 && tick_rate_hz <= 1_000_000);
        assert!(cpu_clock_hz > 0 && cpu_clock_hz <= NOMINAL_CPU_CLOCK_HZ);
        // SysTick reload is 24 bits wide.
        assert!(
            cpu_clock_hz / tick_rate_hz > 0 && cpu_clock_hz / tick_rate_hz <= MAX_SYSTICK_PERIOD
        );

        let tick_period_us = 1_000_000 / tick_rate_hz;

        Self {
            cpu_clock_hz,
            tick_rate_hz,
            tick_period_us,
            clock_divider: NOMINAL_CPU_CLOCK_HZ / cpu_clock_hz,
            tick_division: TickDivision::for_period(tick_period_us),
        }
    }

    pub const fn cpu_clock_hz(&self) -> u32 {
        self.cpu_clock_hz
    }

    pub const fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// Microseconds between two RTOS ticks.
    pub const fn tick_period_us(&self) -> u32 {
        self.tick_period_us
    }

    /// Factor between real time and timer time when the CPU runs slower than
    /// nominal, as on FPGA.
    pub const fn clock_divider(&self) -> u32 {
        self.clock_divider
    }

    pub const fn tick_division(&self) -> TickDivision {
        self.tick_division
    }

    /// SysTick period in CPU cycles.
    pub const fn systick_period(&self) -> u32 {
        self.cpu_clock_hz / self.tick_rate_hz
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_CLOCK_HZ, DEFAULT_TICK_RATE_HZ)
    }
}

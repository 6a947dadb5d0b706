//! SysTick, the RTOS tick generator

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

const SYST_CSR_ENABLE: u32 = 1 << 0;

/// Control over the periodic tick of the RTOS.
pub trait TickGenerator {
    fn stop(&self);

    fn start(&self);

    /// Current countdown value.
    fn countdown(&self) -> u32;

    /// Write the reload value. Unlike [`TickGenerator::set_period`] this
    /// accepts 0.
    fn set_reload(&self, reload: u32);

    /// Write 0 to the countdown, forcing a reload on the next clock.
    fn clear_countdown(&self);

    /// Set the tick period in CPU cycles.
    fn set_period(&self, cycles: u32) {
        debug_assert!(cycles > 0 && cycles <= (1 << 24));
        self.set_reload(cycles - 1);
    }
}

/// The core's SysTick configured as the RTOS tick source.
pub struct SysTick {
    syst: SYST,
}

impl SysTick {
    pub fn new(mut syst: SYST, period_cycles: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.enable_interrupt();
        let this = Self { syst };
        this.set_period(period_cycles);
        this.clear_countdown();
        this
    }

    pub fn free(self) -> SYST {
        self.syst
    }
}

impl TickGenerator for SysTick {
    #[inline]
    fn stop(&self) {
        unsafe { self.syst.csr.modify(|csr| csr & !SYST_CSR_ENABLE) };
    }

    #[inline]
    fn start(&self) {
        unsafe { self.syst.csr.modify(|csr| csr | SYST_CSR_ENABLE) };
    }

    #[inline]
    fn countdown(&self) -> u32 {
        SYST::get_current()
    }

    #[inline]
    fn set_reload(&self, reload: u32) {
        debug_assert!(reload < (1 << 24));
        unsafe { self.syst.rvr.write(reload) };
    }

    #[inline]
    fn clear_countdown(&self) {
        unsafe { self.syst.cvr.write(0) };
    }
}

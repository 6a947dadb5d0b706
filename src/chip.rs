//! CC23X0 device
//!
//! Ties the peripheral drivers and the Cortex-M0+ core peripherals together
//! into the [`Hardware`] the power policy runs on.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::{NVIC, SCB, SYST};
use cortex_m::{asm, interrupt, register};

use crate::ckmd::{Ckmd, LfClockStatus, LfSource};
use crate::evtsvt::{EventFabric, EventRouting, Publisher};
use crate::power::{Hardware, InterruptKey, PolicyConfig};
use crate::rtc::{Rtc, RtcAccess};
use crate::systick::{SysTick, TickGenerator};
use crate::systim::{Channel, SysTimer, SysTimerAccess, SysTimerStatus, CHANNEL_COUNT};

const SCB_SCR_SLEEPDEEP: u32 = 1 << 2;

/// Device interrupt lines used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Interrupt {
    /// Shared by the SysTimer and the RTC.
    CPUIRQ16 = 16,
}

unsafe impl InterruptNumber for Interrupt {
    #[inline]
    fn number(self) -> u16 {
        self as u16
    }
}

static mut TAKEN: bool = false;

pub struct Cc23x0 {
    pub systim: SysTimer,
    pub rtc: Rtc,
    pub evtsvt: EventFabric,
    pub ckmd: Ckmd,
    pub systick: SysTick,
    scb: SCB,
    clock_dependencies: Option<fn()>,
}

impl Cc23x0 {
    /// Take the device. Returns `None` if it was already taken.
    ///
    /// SysTick is configured for `config`'s tick rate and CPUIRQ16 is routed
    /// to the SysTimer.
    pub fn take(syst: SYST, scb: SCB, config: &PolicyConfig) -> Option<Self> {
        interrupt::free(|_| {
            // Safety: only accessed with interrupts disabled.
            if unsafe { TAKEN } {
                return None;
            }
            unsafe { TAKEN = true };

            // Safety: guarded by `TAKEN`.
            let chip = unsafe {
                Self {
                    systim: SysTimer::new(),
                    rtc: Rtc::new(),
                    evtsvt: EventFabric::new(),
                    ckmd: Ckmd::new(),
                    systick: SysTick::new(syst, config.systick_period()),
                    scb,
                    clock_dependencies: None,
                }
            };

            chip.rtc.listen();
            chip.evtsvt.route_cpuirq16(Publisher::SysTimer0);

            Some(chip)
        })
    }

    /// Hook run right after standby to re-enable the clocks the radio
    /// peripherals (LRFD) depend on.
    pub fn set_clock_dependency_hook(&mut self, hook: fn()) {
        self.clock_dependencies = Some(hook);
    }
}

impl SysTimerAccess for Cc23x0 {
    #[inline]
    fn time_1us(&self) -> u32 {
        self.systim.time_1us()
    }

    #[inline]
    fn imask(&self) -> u32 {
        self.systim.imask()
    }

    #[inline]
    fn set_imask(&self, mask: u32) {
        self.systim.set_imask(mask)
    }

    #[inline]
    fn armed(&self) -> u32 {
        self.systim.armed()
    }

    #[inline]
    fn set_armed(&self, mask: u32) {
        self.systim.set_armed(mask)
    }

    #[inline]
    fn read_compare_shadow(&self, channel: Channel) -> u32 {
        self.systim.read_compare_shadow(channel)
    }

    #[inline]
    fn read_compare_and_clear(&self, channel: Channel) -> u32 {
        self.systim.read_compare_and_clear(channel)
    }

    #[inline]
    fn write_compares(&self, values: &[u32; CHANNEL_COUNT]) {
        self.systim.write_compares(values)
    }

    #[inline]
    fn status(&self) -> SysTimerStatus {
        self.systim.status()
    }
}

impl RtcAccess for Cc23x0 {
    #[inline]
    fn time_8us(&self) -> u32 {
        self.rtc.time_8us()
    }

    #[inline]
    fn set_compare(&self, ticks: u32) {
        self.rtc.set_compare(ticks)
    }

    #[inline]
    fn disarm(&self) {
        self.rtc.disarm()
    }

    #[inline]
    fn clear_event(&self) {
        self.rtc.clear_event()
    }

    #[inline]
    fn sync(&self) {
        self.rtc.sync()
    }
}

impl EventRouting for Cc23x0 {
    #[inline]
    fn route_cpuirq16(&self, publisher: Publisher) {
        self.evtsvt.route_cpuirq16(publisher)
    }

    #[inline]
    fn cpuirq16_route(&self) -> Option<Publisher> {
        self.evtsvt.cpuirq16_route()
    }
}

impl LfClockStatus for Cc23x0 {
    #[inline]
    fn lf_source(&self) -> LfSource {
        self.ckmd.lf_source()
    }

    #[inline]
    fn filter_settled(&self) -> bool {
        self.ckmd.filter_settled()
    }

    #[inline]
    fn lf_tick(&self) -> bool {
        self.ckmd.lf_tick()
    }
}

impl TickGenerator for Cc23x0 {
    #[inline]
    fn stop(&self) {
        self.systick.stop()
    }

    #[inline]
    fn start(&self) {
        self.systick.start()
    }

    #[inline]
    fn countdown(&self) -> u32 {
        self.systick.countdown()
    }

    #[inline]
    fn set_reload(&self, reload: u32) {
        self.systick.set_reload(reload)
    }

    #[inline]
    fn clear_countdown(&self) {
        self.systick.clear_countdown()
    }
}

impl Hardware for Cc23x0 {
    #[inline]
    fn disable_interrupts(&self) -> InterruptKey {
        let was_enabled = register::primask::read().is_active();
        interrupt::disable();
        InterruptKey::new(was_enabled)
    }

    #[inline]
    fn restore_interrupts(&self, key: InterruptKey) {
        key.restore_with(
            // Safety: interrupts were enabled when `key` was taken.
            || unsafe { interrupt::enable() },
            interrupt::disable,
        );
    }

    #[inline]
    fn clear_pending(&self, interrupt: Interrupt) {
        NVIC::unpend(interrupt);
    }

    #[inline]
    fn wait_for_interrupt(&self) {
        asm::wfi();
    }

    // TODO: replace with the ROM `HapiEnterStandby` entry, which saves and
    // restores the CPU state that standby does not retain.
    fn enter_standby(&self) {
        unsafe { self.scb.scr.modify(|scr| scr | SCB_SCR_SLEEPDEEP) };
        asm::dsb();
        asm::wfi();
        unsafe { self.scb.scr.modify(|scr| scr & !SCB_SCR_SLEEPDEEP) };
    }

    fn apply_clock_dependencies(&self) {
        if let Some(hook) = self.clock_dependencies {
            hook();
        }
    }
}

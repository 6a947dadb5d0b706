#![no_main]
#![no_std]

use core::cell::Cell;

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::SCB;
use cortex_m_rt as rt;
use rt::{entry, exception};

use panic_rtt_target as _;

use rtt_target::{rprintln, rtt_init_print};

use cc23x0_hal::power::idle::suppress_ticks_and_sleep;
use cc23x0_hal::power::notify::NotifyStatus;
use cc23x0_hal::power::{
    ConstraintRegistry, NotifyRegistry, PolicyConfig, PowerContext, PowerEvent, Scheduler,
    SleepModeStatus,
};
use cc23x0_hal::systick::TickGenerator;
use cc23x0_hal::Cc23x0;

const CONFIG: PolicyConfig = PolicyConfig::new(48_000_000, 1_000);
const REPORT_PERIOD_TICKS: u32 = 1_000;

static TICKS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
static CONSTRAINTS: ConstraintRegistry = ConstraintRegistry::new();
static NOTIFY: NotifyRegistry<4> = NotifyRegistry::new();

/// Bare tick counter standing in for an RTOS kernel.
struct TickCounter;

impl TickCounter {
    fn now(&self) -> u32 {
        interrupt::free(|cs| TICKS.borrow(cs).get())
    }
}

impl Scheduler for TickCounter {
    fn confirm_sleep_mode_status(&self) -> SleepModeStatus {
        if SCB::is_pendst_pending() {
            SleepModeStatus::Abort
        } else {
            SleepModeStatus::Standard
        }
    }

    fn suspend_all(&self) {}

    fn resume_all(&self) {
        unsafe { interrupt::enable() };
    }

    fn step_tick(&self, ticks: u32) {
        interrupt::free(|cs| {
            let count = TICKS.borrow(cs);
            count.set(count.get().wrapping_add(ticks));
        });
    }
}

#[exception]
fn SysTick() {
    interrupt::free(|cs| {
        let count = TICKS.borrow(cs);
        count.set(count.get().wrapping_add(1));
    });
}

fn on_power_event(event: PowerEvent, _: usize) -> NotifyStatus {
    rprintln!("power event: {:?}", event);
    NotifyStatus::Done
}

#[entry]
fn main() -> ! {
    rtt_init_print!();

    match inner_main() {
        Ok(()) => SCB::sys_reset(),
        Err(e) => panic!("{}", e),
    }
}

fn inner_main() -> Result<(), &'static str> {
    let core_periph = cortex_m::Peripherals::take().ok_or("unable to get core peripherals")?;
    let chip = Cc23x0::take(core_periph.SYST, core_periph.SCB, &CONFIG)
        .ok_or("unable to get the device")?;

    interrupt::free(|cs| {
        NOTIFY
            .register(cs, PowerEvent::EnteringStandby | PowerEvent::AwakeStandby, on_power_event, 0)
            .map(|_| ())
    })
    .map_err(|_| "unable to register for power events")?;

    let mut ctx = PowerContext::new(CONFIG, &CONSTRAINTS, &NOTIFY);
    let os = TickCounter;

    unsafe { interrupt::enable() };
    chip.systick.start();

    let mut next_report = REPORT_PERIOD_TICKS;
    loop {
        let now = os.now();
        if now.wrapping_sub(next_report) < u32::MAX / 2 {
            rprintln!("{} ticks, {:?}", now, ctx.stats());
            next_report = next_report.wrapping_add(REPORT_PERIOD_TICKS);
        }

        suppress_ticks_and_sleep(&mut ctx, &chip, &os, next_report.wrapping_sub(now));
    }
}

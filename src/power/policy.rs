//! Sleep policies
//!
//! [`StandbyPolicy`] picks the deepest state allowed by the active constraints
//! and the time left until the next deadline. [`WfiPolicy`] never goes deeper
//! than idle.

use cortex_m::interrupt::CriticalSection;

use super::budget;
use super::config::{PolicyConfig, TOTAL_TIME_STANDBY_US, WAKE_DELAY_STANDBY_US};
use super::constraints::Constraint;
use super::context::PowerContext;
use super::notify::PowerEvent;
use super::reconcile::TickReconciler;
use super::{idle, Hardware, Scheduler, SleepModeStatus};
use crate::chip::Interrupt;
use crate::evtsvt::Publisher;
use crate::rtc::RTC_TO_SYSTIMER_TICKS;
use crate::systim::TimerSnapshot;

/// What one policy invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The scheduler withdrew its permission to sleep.
    Aborted,
    /// Neither standby nor idle was allowed.
    Skipped,
    Idle,
    Standby { slept_ticks: u32 },
}

/// RTC compare offset for a sleep of `soonest_us` SysTimer ticks.
///
/// The RTC is programmed to fire early by the wakeup latency so the device is
/// running again when the deadline arrives.
#[inline]
pub const fn rtc_wakeup_delta(config: &PolicyConfig, soonest_us: u32) -> u32 {
    soonest_us.saturating_sub(WAKE_DELAY_STANDBY_US) / config.clock_divider()
        / RTC_TO_SYSTIMER_TICKS
}

/// Time from `now` until `deadline`, which was at most `budget` away when
/// it was computed. 0 once the deadline has passed.
#[inline]
pub const fn time_left(deadline: u32, now: u32, budget: u32) -> u32 {
    let left = deadline.wrapping_sub(now);
    if left > budget {
        0
    } else {
        left
    }
}

pub struct StandbyPolicy;

impl StandbyPolicy {
    /// Run one idle cycle.
    ///
    /// Interrupts are disabled from the sleep confirmation until the saved
    /// state is restored on return.
    pub fn run<H, S, const N: usize>(ctx: &mut PowerContext<'_, N>, hw: &H, os: &S) -> Outcome
    where
        H: Hardware + ?Sized,
        S: Scheduler + ?Sized,
    {
        let key = hw.disable_interrupts();
        // Safety: interrupts are disabled until `key` is restored below.
        let cs = unsafe { CriticalSection::new() };

        if os.confirm_sleep_mode_status() == SleepModeStatus::Abort {
            hw.restore_interrupts(key);
            ctx.stats.record(Outcome::Aborted);
            return Outcome::Aborted;
        }

        let constraints = ctx.constraints.mask(&cs);
        let mut standby_allowed = !constraints.contains(Constraint::DisallowStandby);
        let mut idle_allowed = !constraints.contains(Constraint::DisallowIdle);
        log_verbose!(
            "StandbyPolicy::run: constraints = {:#x}, idle time = {} ticks",
            constraints.bits(),
            ctx.idle_time_os()
        );

        if standby_allowed && !hw.is_lfinc_filter_allowing_standby() {
            standby_allowed = false;
            idle_allowed = false;
            log_info!(
                "StandbyPolicy::run: LFINC filter is not guaranteed to have settled yet. \
                 Standby and idle are not allowed"
            );
        }

        let outcome = if standby_allowed {
            let snapshot = TimerSnapshot::capture(hw);
            let systim_before = hw.time_1us();

            let soonest = budget::sleep_budget(
                budget::soonest_channel_delta(&snapshot, systim_before),
                budget::os_delta(ctx.idle_time_os(), ctx.config.tick_period_us()),
            );

            if soonest > TOTAL_TIME_STANDBY_US {
                log_info!(
                    "StandbyPolicy::run: Entering standby. Soonest timeout = {:#010x}",
                    systim_before.wrapping_add(soonest)
                );
                let slept_ticks =
                    Self::standby(ctx, &cs, hw, os, &snapshot, soonest, systim_before);
                Outcome::Standby { slept_ticks }
            } else {
                Self::idle(hw, idle_allowed)
            }
        } else {
            Self::idle(hw, idle_allowed)
        };

        hw.restore_interrupts(key);
        ctx.stats.record(outcome);

        outcome
    }

    fn idle<H: Hardware + ?Sized>(hw: &H, idle_allowed: bool) -> Outcome {
        if idle_allowed {
            hw.wait_for_interrupt();
            Outcome::Idle
        } else {
            Outcome::Skipped
        }
    }

    fn standby<H, S, const N: usize>(
        ctx: &PowerContext<'_, N>,
        cs: &CriticalSection,
        hw: &H,
        os: &S,
        snapshot: &TimerSnapshot,
        soonest: u32,
        systim_before: u32,
    ) -> u32
    where
        H: Hardware + ?Sized,
        S: Scheduler + ?Sized,
    {
        idle::scheduler_disable(os);

        // Keep the remainder of the current tick as the first period after
        // wakeup.
        hw.stop();
        let countdown = hw.countdown();
        hw.set_reload(countdown);

        hw.route_cpuirq16(Publisher::AonRtcComb);
        hw.clear_pending(Interrupt::CPUIRQ16);

        // The two timers are read back to back so the RTC compare lines up
        // with the SysTimer deadline. Writing the compare value arms the
        // channel.
        let remaining = time_left(systim_before.wrapping_add(soonest), hw.time_1us(), soonest);
        let rtc_now = hw.time_8us();
        hw.set_compare(rtc_now.wrapping_add(rtc_wakeup_delta(&ctx.config, remaining)));

        match ctx.notify.notify(cs, PowerEvent::EnteringStandby) {
            Ok(()) => hw.enter_standby(),
            Err(_) => log_warn!("StandbyPolicy::run: client refused standby, not halting"),
        }

        hw.disarm();
        hw.clear_event();
        hw.sync();
        hw.clear_pending(Interrupt::CPUIRQ16);
        hw.route_cpuirq16(Publisher::SysTimer0);

        hw.wait_until_running();
        snapshot.restore(hw);

        hw.apply_clock_dependencies();
        let _ = ctx.notify.notify(cs, PowerEvent::AwakeStandby);

        let systim_after = hw.time_1us();
        let slept_ticks = TickReconciler::new(&ctx.config).step(os, systim_before, systim_after);

        hw.clear_countdown();
        hw.start();
        hw.set_period(ctx.config.systick_period());

        idle::scheduler_restore(os);

        log_info!(
            "StandbyPolicy::run: Exiting standby. Time after = {:#010x}",
            systim_after
        );

        slept_ticks
    }
}

/// Idle only. Never enters standby.
pub struct WfiPolicy;

impl WfiPolicy {
    pub fn run<H, const N: usize>(ctx: &mut PowerContext<'_, N>, hw: &H) -> Outcome
    where
        H: Hardware + ?Sized,
    {
        let key = hw.disable_interrupts();
        // Safety: interrupts are disabled until `key` is restored below.
        let cs = unsafe { CriticalSection::new() };
        let idle_allowed = !ctx.constraints.mask(&cs).contains(Constraint::DisallowIdle);
        hw.restore_interrupts(key);

        let outcome = StandbyPolicy::idle(hw, idle_allowed);
        ctx.stats.record(outcome);

        outcome
    }
}

//! RTOS idle hook.

use super::context::PowerContext;
use super::{Hardware, Scheduler};

/// Tickless idle entry point.
///
/// Called by the RTOS idle task with the number of ticks until the next task
/// is due to wake. The RTOS tick count is brought up to date before this
/// returns.
pub fn suppress_ticks_and_sleep<H, S, const N: usize>(
    ctx: &mut PowerContext<'_, N>,
    hw: &H,
    os: &S,
    expected_idle_ticks: u32,
) where
    H: Hardware + ?Sized,
    S: Scheduler + ?Sized,
{
    ctx.set_idle_time_os(expected_idle_ticks);
    let _ = ctx.idle_func(hw, os);
}

/// Stop task switching around a standby cycle.
#[inline]
pub fn scheduler_disable<S: Scheduler + ?Sized>(os: &S) {
    os.suspend_all();
}

/// Resume task switching. Interrupts are enabled on return.
#[inline]
pub fn scheduler_restore<S: Scheduler + ?Sized>(os: &S) {
    os.resume_all();
}

//! Sleep budget
//!
//! How long the device may sleep is bounded both by the SysTimer channels that
//! have their interrupt enabled and by the time until the RTOS next needs to
//! run. All results are in SysTimer 1us ticks.

use crate::systim::{Channel, Resolution, TimerSnapshot, MAX_SYSTIMER_DELTA};

/// Time until a compare value fires, in 1us.
///
/// `now_1us` is shifted into the channel's resolution before subtracting so
/// the difference wraps correctly in that resolution. Deltas larger than
/// [`MAX_SYSTIMER_DELTA`] belong to events already in the past, which are
/// treated as due now.
#[inline]
pub const fn channel_delta(compare: u32, now_1us: u32, resolution: Resolution) -> u32 {
    let shift = resolution.shift();
    let delta = compare.wrapping_sub(now_1us << shift);

    if delta > MAX_SYSTIMER_DELTA {
        0
    } else {
        delta >> shift
    }
}

/// Time until the soonest channel with its interrupt enabled fires.
///
/// [`MAX_SYSTIMER_DELTA`] if no channel interrupt is enabled.
pub fn soonest_channel_delta(snapshot: &TimerSnapshot, now_1us: u32) -> u32 {
    if !snapshot.any_interrupt_enabled() {
        return MAX_SYSTIMER_DELTA;
    }

    Channel::ALL
        .iter()
        .filter(|channel| snapshot.interrupt_enabled(**channel))
        .map(|channel| {
            channel_delta(
                snapshot.compares[channel.index()],
                now_1us,
                channel.resolution(),
            )
        })
        .min()
        .unwrap_or(MAX_SYSTIMER_DELTA)
}

/// Time until the RTOS expects to run again.
#[inline]
pub const fn os_delta(idle_ticks: u32, tick_period_us: u32) -> u32 {
    idle_ticks.saturating_mul(tick_period_us)
}

/// Time the device may sleep: whichever of the two bounds is smaller.
#[inline]
pub fn sleep_budget(channel_delta: u32, os_delta: u32) -> u32 {
    channel_delta.min(os_delta)
}

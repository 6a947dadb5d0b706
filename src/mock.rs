//! Recording device model used by the unit tests.
//!
//! Every mutating access is appended to one ordered log shared with the
//! scheduler side, so tests can assert on the exact sequence of a standby
//! cycle.

use std::cell::{Cell, RefCell};

use crate::chip::Interrupt;
use crate::ckmd::{LfClockStatus, LfSource};
use crate::evtsvt::{EventRouting, Publisher};
use crate::power::{Hardware, InterruptKey, PowerEvent, Scheduler, SleepModeStatus};
use crate::rtc::{RtcAccess, RTC_TO_SYSTIMER_TICKS};
use crate::systick::TickGenerator;
use crate::systim::{Channel, SysTimerAccess, SysTimerStatus, CHANNEL_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    DisableInterrupts,
    RestoreInterrupts(bool),
    ReadCompareShadow(Channel),
    ReadCompareAndClear(Channel),
    /// Status poll that found the SysTimer running and in sync.
    SysTimerRunning,
    WriteCompares([u32; CHANNEL_COUNT]),
    SetArmed(u32),
    SetImask(u32),
    RtcReadTime,
    RtcSetCompare(u32),
    RtcDisarm,
    RtcClearEvent,
    RtcSync,
    Route(Publisher),
    ClearPending(Interrupt),
    SysTickStop,
    SysTickStart,
    SysTickSetReload(u32),
    SysTickClearCountdown,
    Wfi,
    EnterStandby,
    ApplyClockDependencies,
    Notified(PowerEvent),
    SuspendAll,
    ResumeAll,
    StepTick(u32),
}

impl Op {
    fn is_read(&self) -> bool {
        matches!(
            self,
            Op::ReadCompareShadow(_) | Op::ReadCompareAndClear(_) | Op::RtcReadTime
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysTimState {
    pub compares: [u32; CHANNEL_COUNT],
    pub imask: u32,
    pub armed: u32,
    pub time_1us: u32,
    /// Status polls left before the timer reports running again.
    pub sync_polls: u32,
    /// How far the 1us time moves on every read.
    pub step_per_read: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RtcState {
    pub time_8us: u32,
    pub compare: u32,
    pub armed: bool,
    pub event: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CkmdState {
    pub source: LfSource,
    pub filter_settled: bool,
    pub lf_tick: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysTickState {
    pub enabled: bool,
    pub countdown: u32,
    pub reload: u32,
}

/// What happens while the mock sits in standby.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StandbyModel {
    /// Time that passes, in us. Applied to both timers.
    pub elapsed_us: u32,
    /// The wakeup came from the RTC rather than another source.
    pub woken_by_rtc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    pub status: SleepModeStatus,
    pub suspended: bool,
    pub tick_count: u32,
}

pub struct MockHardware {
    pub systim: RefCell<SysTimState>,
    pub rtc: RefCell<RtcState>,
    pub route: Cell<Publisher>,
    pub ckmd: RefCell<CkmdState>,
    pub systick: RefCell<SysTickState>,
    pub standby: RefCell<StandbyModel>,
    pub scheduler: RefCell<SchedulerState>,
    pub interrupts_enabled: Cell<bool>,
    log: RefCell<Vec<Op>>,
}

impl MockHardware {
    pub fn new() -> Self {
        Self {
            systim: RefCell::new(SysTimState::default()),
            rtc: RefCell::new(RtcState::default()),
            route: Cell::new(Publisher::SysTimer0),
            ckmd: RefCell::new(CkmdState {
                source: LfSource::Lfxt,
                filter_settled: true,
                lf_tick: true,
            }),
            systick: RefCell::new(SysTickState {
                enabled: true,
                countdown: 0,
                reload: 47_999,
            }),
            standby: RefCell::new(StandbyModel::default()),
            scheduler: RefCell::new(SchedulerState {
                status: SleepModeStatus::Standard,
                suspended: false,
                tick_count: 0,
            }),
            interrupts_enabled: Cell::new(true),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn push(&self, op: Op) {
        self.log.borrow_mut().push(op);
    }

    /// Every recorded access.
    pub fn log(&self) -> Vec<Op> {
        self.log.borrow().clone()
    }

    /// Recorded accesses without the reads.
    pub fn writes(&self) -> Vec<Op> {
        self.log.borrow().iter().copied().filter(|op| !op.is_read()).collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// SysTimer registers written back before it resynchronised with the RTC
    /// would not hold.
    fn assert_synced(&self) {
        assert_eq!(
            self.systim.borrow().sync_polls,
            0,
            "SysTimer written while still syncing"
        );
    }

    /// Position of the first `op` in the log.
    pub fn position(&self, op: Op) -> Option<usize> {
        self.log.borrow().iter().position(|o| *o == op)
    }
}

impl SysTimerAccess for MockHardware {
    fn time_1us(&self) -> u32 {
        let mut systim = self.systim.borrow_mut();
        let now = systim.time_1us;
        systim.time_1us = now.wrapping_add(systim.step_per_read);
        now
    }

    fn imask(&self) -> u32 {
        self.systim.borrow().imask
    }

    fn set_imask(&self, mask: u32) {
        self.assert_synced();
        self.push(Op::SetImask(mask));
        self.systim.borrow_mut().imask = mask;
    }

    fn armed(&self) -> u32 {
        self.systim.borrow().armed
    }

    fn set_armed(&self, mask: u32) {
        self.assert_synced();
        self.push(Op::SetArmed(mask));
        self.systim.borrow_mut().armed |= mask;
    }

    fn read_compare_shadow(&self, channel: Channel) -> u32 {
        self.push(Op::ReadCompareShadow(channel));
        self.systim.borrow().compares[channel.index()]
    }

    fn read_compare_and_clear(&self, channel: Channel) -> u32 {
        self.push(Op::ReadCompareAndClear(channel));
        self.systim.borrow().compares[channel.index()]
    }

    fn write_compares(&self, values: &[u32; CHANNEL_COUNT]) {
        self.assert_synced();
        self.push(Op::WriteCompares(*values));
        self.systim.borrow_mut().compares = *values;
    }

    fn status(&self) -> SysTimerStatus {
        let mut systim = self.systim.borrow_mut();
        let sync_up = systim.sync_polls > 0;
        systim.sync_polls = systim.sync_polls.saturating_sub(1);
        if !sync_up {
            self.push(Op::SysTimerRunning);
        }
        SysTimerStatus { run: true, sync_up }
    }
}

impl RtcAccess for MockHardware {
    fn time_8us(&self) -> u32 {
        self.push(Op::RtcReadTime);
        self.rtc.borrow().time_8us
    }

    fn set_compare(&self, ticks: u32) {
        self.push(Op::RtcSetCompare(ticks));
        let mut rtc = self.rtc.borrow_mut();
        rtc.compare = ticks;
        rtc.armed = true;
    }

    fn disarm(&self) {
        self.push(Op::RtcDisarm);
        self.rtc.borrow_mut().armed = false;
    }

    fn clear_event(&self) {
        self.push(Op::RtcClearEvent);
        self.rtc.borrow_mut().event = false;
    }

    fn sync(&self) {
        self.push(Op::RtcSync);
    }
}

impl EventRouting for MockHardware {
    fn route_cpuirq16(&self, publisher: Publisher) {
        self.push(Op::Route(publisher));
        self.route.set(publisher);
    }

    fn cpuirq16_route(&self) -> Option<Publisher> {
        Some(self.route.get())
    }
}

impl LfClockStatus for MockHardware {
    fn lf_source(&self) -> LfSource {
        self.ckmd.borrow().source
    }

    fn filter_settled(&self) -> bool {
        self.ckmd.borrow().filter_settled
    }

    fn lf_tick(&self) -> bool {
        self.ckmd.borrow().lf_tick
    }
}

impl TickGenerator for MockHardware {
    fn stop(&self) {
        self.push(Op::SysTickStop);
        self.systick.borrow_mut().enabled = false;
    }

    fn start(&self) {
        self.push(Op::SysTickStart);
        self.systick.borrow_mut().enabled = true;
    }

    fn countdown(&self) -> u32 {
        self.systick.borrow().countdown
    }

    fn set_reload(&self, reload: u32) {
        self.push(Op::SysTickSetReload(reload));
        self.systick.borrow_mut().reload = reload;
    }

    fn clear_countdown(&self) {
        self.push(Op::SysTickClearCountdown);
        self.systick.borrow_mut().countdown = 0;
    }
}

impl Hardware for MockHardware {
    fn disable_interrupts(&self) -> InterruptKey {
        self.push(Op::DisableInterrupts);
        InterruptKey::new(self.interrupts_enabled.replace(false))
    }

    fn restore_interrupts(&self, key: InterruptKey) {
        self.push(Op::RestoreInterrupts(key.was_enabled()));
        key.restore_with(
            || self.interrupts_enabled.set(true),
            || self.interrupts_enabled.set(false),
        );
    }

    fn clear_pending(&self, interrupt: Interrupt) {
        self.push(Op::ClearPending(interrupt));
    }

    fn wait_for_interrupt(&self) {
        self.push(Op::Wfi);
    }

    /// Advances both timers and drops the SysTimer state, which is not
    /// retained in standby.
    fn enter_standby(&self) {
        self.push(Op::EnterStandby);
        let model = self.standby.borrow().clone();

        {
            let mut systim = self.systim.borrow_mut();
            systim.time_1us = systim.time_1us.wrapping_add(model.elapsed_us);
            systim.compares = [0; CHANNEL_COUNT];
            systim.armed = 0;
            systim.imask = 0;
            systim.sync_polls = 2;
        }

        let mut rtc = self.rtc.borrow_mut();
        rtc.time_8us = rtc
            .time_8us
            .wrapping_add(model.elapsed_us / RTC_TO_SYSTIMER_TICKS);
        if model.woken_by_rtc {
            rtc.event = true;
            rtc.armed = false;
        }
    }

    fn apply_clock_dependencies(&self) {
        self.push(Op::ApplyClockDependencies);
    }
}

impl Scheduler for MockHardware {
    fn confirm_sleep_mode_status(&self) -> SleepModeStatus {
        self.scheduler.borrow().status
    }

    fn suspend_all(&self) {
        self.push(Op::SuspendAll);
        self.scheduler.borrow_mut().suspended = true;
    }

    fn resume_all(&self) {
        self.push(Op::ResumeAll);
        self.scheduler.borrow_mut().suspended = false;
        self.interrupts_enabled.set(true);
    }

    fn step_tick(&self, ticks: u32) {
        self.push(Op::StepTick(ticks));
        let mut scheduler = self.scheduler.borrow_mut();
        scheduler.tick_count = scheduler.tick_count.wrapping_add(ticks);
    }
}

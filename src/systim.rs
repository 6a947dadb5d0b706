//! SysTimer
//!
//! The SysTimer is the fine-grained, multi-channel compare timer used by the
//! clock service and the radio layer. It is not retained in standby: compare
//! values, armed state and the interrupt mask are lost and have to be saved
//! and written back by software around every standby cycle.

use core::marker::PhantomData;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

use crate::memmap::SYSTIM_BASE;

/// Number of compare channels.
pub const CHANNEL_COUNT: usize = 5;

/// Max number of SysTimer ticks a compare value may lie in the future.
///
/// Events trigger immediately if the compare value is less than 2^22 ticks in
/// the past, so the furthest one can schedule is 2^32 - 2^22 - 1 ticks. Any
/// computed delta above this is an event that is already due.
pub const MAX_SYSTIMER_DELTA: u32 = 0xFFBF_FFFF;

register_structs! {
    pub SysTimRegisters {
        (0x000 => _reserved0),
        (0x044 => imask: ReadWrite<u32, EVENT::Register>),
        (0x048 => ris: ReadOnly<u32, EVENT::Register>),
        (0x04C => mis: ReadOnly<u32, EVENT::Register>),
        (0x050 => iset: WriteOnly<u32, EVENT::Register>),
        (0x054 => iclr: WriteOnly<u32, EVENT::Register>),
        (0x058 => imset: WriteOnly<u32, EVENT::Register>),
        (0x05C => imclr: WriteOnly<u32, EVENT::Register>),
        (0x060 => emu: ReadWrite<u32>),
        (0x064 => _reserved1),
        (0x100 => time250n: ReadOnly<u32>),
        (0x104 => time1u: ReadOnly<u32>),
        (0x108 => _reserved2),
        // Reading CHnCC clears a pending event on the channel.
        (0x200 => chcc: [ReadWrite<u32>; CHANNEL_COUNT]),
        (0x214 => _reserved3),
        // Shadow view of CHnCC without the read side effect.
        (0x280 => chccsr: [ReadWrite<u32>; CHANNEL_COUNT]),
        (0x294 => _reserved4),
        (0x300 => armset: ReadWrite<u32, EVENT::Register>),
        (0x304 => armclr: WriteOnly<u32, EVENT::Register>),
        (0x308 => status: ReadOnly<u32, STATUS::Register>),
        (0x30C => @END),
    }
}

register_bitfields![u32,
    EVENT [
        EV0 OFFSET(0) NUMBITS(1) [],
        EV1 OFFSET(1) NUMBITS(1) [],
        EV2 OFFSET(2) NUMBITS(1) [],
        EV3 OFFSET(3) NUMBITS(1) [],
        EV4 OFFSET(4) NUMBITS(1) []
    ],
    STATUS [
        RUN OFFSET(0) NUMBITS(1) [],
        SYNCUP OFFSET(1) NUMBITS(1) []
    ]
];

/// Native time base of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Us1,
    Ns250,
}

impl Resolution {
    /// Left shift converting a 1us value into this resolution.
    pub const fn shift(self) -> u32 {
        match self {
            Resolution::Us1 => 0,
            Resolution::Ns250 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ch0 = 0,
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
    Ch4 = 4,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Ch0,
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn mask(self) -> u32 {
        1 << (self as u32)
    }

    /// Channel 0 can run at either resolution but the clock service only
    /// ever uses it at 1us, so it is fixed here.
    pub const fn resolution(self) -> Resolution {
        match self {
            Channel::Ch0 | Channel::Ch1 => Resolution::Us1,
            Channel::Ch2 | Channel::Ch3 | Channel::Ch4 => Resolution::Ns250,
        }
    }
}

/// Synchronisation state of the SysTimer with the RTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SysTimerStatus {
    pub run: bool,
    pub sync_up: bool,
}

/// Register level access to the SysTimer.
pub trait SysTimerAccess {
    /// Current time in 1us resolution.
    fn time_1us(&self) -> u32;

    fn imask(&self) -> u32;

    fn set_imask(&self, mask: u32);

    /// Armed state of all channels.
    fn armed(&self) -> u32;

    /// Arm every channel whose bit is set.
    fn set_armed(&self, mask: u32);

    /// Read a compare value without clearing the channel's pending event.
    fn read_compare_shadow(&self, channel: Channel) -> u32;

    /// Read a compare value. This clears a pending event on the channel.
    fn read_compare_and_clear(&self, channel: Channel) -> u32;

    /// Write every compare value in one block.
    fn write_compares(&self, values: &[u32; CHANNEL_COUNT]);

    fn status(&self) -> SysTimerStatus;

    /// Running and done synchronising with the RTC.
    fn is_running(&self) -> bool {
        let status = self.status();
        status.run && !status.sync_up
    }

    /// Wait for the SysTimer to resynchronise with the RTC after standby.
    ///
    /// This takes at most one LFCLK period. Any status other than running or
    /// syncing is undefined behaviour per the hardware.
    fn wait_until_running(&self) {
        while !self.is_running() {
            core::hint::spin_loop();
        }
    }
}

/// Driver for the SysTimer peripheral.
pub struct SysTimer {
    _systim: PhantomData<*const SysTimRegisters>,
}

impl SysTimer {
    /// # Safety
    ///
    /// Only one `SysTimer` may exist.
    pub(crate) const unsafe fn new() -> Self {
        Self {
            _systim: PhantomData,
        }
    }

    fn regs() -> &'static SysTimRegisters {
        unsafe { &*(SYSTIM_BASE as *const SysTimRegisters) }
    }

    /// Current time in 250ns resolution.
    pub fn time_250ns(&self) -> u32 {
        Self::regs().time250n.get()
    }
}

impl SysTimerAccess for SysTimer {
    #[inline]
    fn time_1us(&self) -> u32 {
        Self::regs().time1u.get()
    }

    #[inline]
    fn imask(&self) -> u32 {
        Self::regs().imask.get()
    }

    #[inline]
    fn set_imask(&self, mask: u32) {
        Self::regs().imask.set(mask);
    }

    #[inline]
    fn armed(&self) -> u32 {
        Self::regs().armset.get()
    }

    #[inline]
    fn set_armed(&self, mask: u32) {
        Self::regs().armset.set(mask);
    }

    #[inline]
    fn read_compare_shadow(&self, channel: Channel) -> u32 {
        Self::regs().chccsr[channel.index()].get()
    }

    #[inline]
    fn read_compare_and_clear(&self, channel: Channel) -> u32 {
        Self::regs().chcc[channel.index()].get()
    }

    fn write_compares(&self, values: &[u32; CHANNEL_COUNT]) {
        for (reg, value) in Self::regs().chccsr.iter().zip(values) {
            reg.set(*value);
        }
    }

    #[inline]
    fn status(&self) -> SysTimerStatus {
        let status = Self::regs().status.extract();
        SysTimerStatus {
            run: status.is_set(STATUS::RUN),
            sync_up: status.is_set(STATUS::SYNCUP),
        }
    }
}

/// SysTimer state that does not survive standby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerSnapshot {
    pub compares: [u32; CHANNEL_COUNT],
    pub armed: u32,
    pub imask: u32,
}

impl TimerSnapshot {
    /// Capture the timer state using side effect free reads only.
    pub fn capture<T: SysTimerAccess + ?Sized>(timer: &T) -> Self {
        let imask = timer.imask();
        let armed = timer.armed();

        let mut compares = [0; CHANNEL_COUNT];
        for channel in Channel::ALL {
            compares[channel.index()] = timer.read_compare_shadow(channel);
        }

        Self {
            compares,
            armed,
            imask,
        }
    }

    /// Write the captured state back.
    ///
    /// Compare values go first, then the armed mask, then the interrupt mask.
    /// Arming re-evaluates every channel against its comparator, so channels
    /// whose deadline passed during standby fire right away.
    pub fn restore<T: SysTimerAccess + ?Sized>(&self, timer: &T) {
        timer.write_compares(&self.compares);
        timer.set_armed(self.armed);
        timer.set_imask(self.imask);
    }

    pub const fn interrupt_enabled(&self, channel: Channel) -> bool {
        self.imask & channel.mask() != 0
    }

    pub const fn any_interrupt_enabled(&self) -> bool {
        self.imask != 0
    }
}

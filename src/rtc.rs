//! Always-on Real Time Clock
//!
//! The RTC keeps counting in standby and is the only timer that can wake the
//! device from it. Channel 0 is used in compare mode for that purpose.

use core::marker::PhantomData;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

use crate::memmap::RTC_BASE;

/// The RTC counts in 8us steps; the SysTimer in 1us.
pub const RTC_TO_SYSTIMER_TICKS: u32 = 8;

register_structs! {
    pub RtcRegisters {
        (0x000 => _reserved0),
        (0x044 => imask: ReadWrite<u32, EVENT::Register>),
        (0x048 => ris: ReadOnly<u32, EVENT::Register>),
        (0x04C => mis: ReadOnly<u32, EVENT::Register>),
        (0x050 => iset: WriteOnly<u32, EVENT::Register>),
        (0x054 => iclr: WriteOnly<u32, EVENT::Register>),
        (0x058 => imset: WriteOnly<u32, EVENT::Register>),
        (0x05C => imclr: WriteOnly<u32, EVENT::Register>),
        (0x060 => emu: ReadWrite<u32>),
        (0x064 => ctl: ReadWrite<u32>),
        (0x068 => time8u: ReadOnly<u32>),
        (0x06C => time524m: ReadOnly<u32>),
        // Writing arms channel 0. It disarms itself when it fires.
        (0x070 => ch0cc8u: ReadWrite<u32>),
        (0x074 => ch1cfg: ReadWrite<u32>),
        (0x078 => ch1ccsr: ReadWrite<u32>),
        (0x07C => ch1cc8u: ReadWrite<u32>),
        (0x080 => ch1cptr: ReadOnly<u32>),
        (0x084 => armset: ReadWrite<u32, ARM::Register>),
        (0x088 => armclr: WriteOnly<u32, ARM::Register>),
        (0x08C => @END),
    }
}

register_bitfields![u32,
    EVENT [
        EV0 OFFSET(0) NUMBITS(1) [],
        EV1 OFFSET(1) NUMBITS(1) []
    ],
    ARM [
        CH0 OFFSET(0) NUMBITS(1) [],
        CH1 OFFSET(1) NUMBITS(1) []
    ]
];

/// Register level access to the RTC.
pub trait RtcAccess {
    /// Current time in 8us resolution.
    fn time_8us(&self) -> u32;

    /// Program and arm the channel 0 compare value.
    fn set_compare(&self, ticks: u32);

    /// Disarm channel 0.
    fn disarm(&self);

    /// Clear the channel 0 event in RIS.
    fn clear_event(&self);

    /// Read back from the ULL domain so that every preceding write has
    /// taken effect.
    fn sync(&self);
}

/// Driver for the RTC peripheral.
pub struct Rtc {
    _rtc: PhantomData<*const RtcRegisters>,
}

impl Rtc {
    /// # Safety
    ///
    /// Only one `Rtc` may exist.
    pub(crate) const unsafe fn new() -> Self {
        Self { _rtc: PhantomData }
    }

    fn regs() -> &'static RtcRegisters {
        unsafe { &*(RTC_BASE as *const RtcRegisters) }
    }

    /// Enable the channel 0 event as an interrupt source.
    pub fn listen(&self) {
        Self::regs().imset.write(EVENT::EV0::SET);
    }

    /// Check whether channel 0 is still armed.
    pub fn is_armed(&self) -> bool {
        Self::regs().armset.is_set(ARM::CH0)
    }
}

impl RtcAccess for Rtc {
    #[inline]
    fn time_8us(&self) -> u32 {
        Self::regs().time8u.get()
    }

    #[inline]
    fn set_compare(&self, ticks: u32) {
        Self::regs().ch0cc8u.set(ticks);
    }

    #[inline]
    fn disarm(&self) {
        Self::regs().armclr.write(ARM::CH0::SET);
    }

    #[inline]
    fn clear_event(&self) {
        Self::regs().iclr.write(EVENT::EV0::SET);
    }

    #[inline]
    fn sync(&self) {
        let _ = Self::regs().armset.get();
    }
}

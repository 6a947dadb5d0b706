//! Clock Management Digital
//!
//! Only the LF clock status needed by the standby policy is exposed here.

use core::marker::PhantomData;

use tock_registers::interfaces::Readable;
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::memmap::CKMD_BASE;

register_structs! {
    pub CkmdRegisters {
        (0x000 => _reserved0),
        (0x048 => ris: ReadOnly<u32, INT::Register>),
        (0x04C => _reserved1),
        (0x0D0 => lfclksel: ReadWrite<u32, LFCLKSEL::Register>),
        (0x0D4 => _reserved2),
        (0x0E0 => lfclkstat: ReadOnly<u32, LFCLKSTAT::Register>),
        (0x0E4 => @END),
    }
}

register_bitfields![u32,
    INT [
        HFXTGOOD OFFSET(0) NUMBITS(1) [],
        AMPSETTLED OFFSET(2) NUMBITS(1) [],
        LFCLKGOOD OFFSET(7) NUMBITS(1) [],
        LFTICK OFFSET(9) NUMBITS(1) []
    ],
    LFCLKSEL [
        MAIN OFFSET(0) NUMBITS(2) [
            Lfosc = 0,
            Lfxt = 1,
            Extlf = 2
        ],
        PRE OFFSET(2) NUMBITS(2) []
    ],
    LFCLKSTAT [
        FLTSETTLED OFFSET(0) NUMBITS(1) []
    ]
];

/// Source of the low frequency clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfSource {
    Lfosc,
    Lfxt,
    Extlf,
}

/// LF clock status as seen by the standby policy.
pub trait LfClockStatus {
    fn lf_source(&self) -> LfSource;

    /// LFINC filter reports settled.
    fn filter_settled(&self) -> bool;

    /// An LFTICK was seen since the flag was last cleared.
    fn lf_tick(&self) -> bool;

    /// Whether the LFINC filter allows entering standby.
    ///
    /// FLTSETTLED has been observed to pulse high for ~15us about 130us after
    /// HFXT starts, before the filter is really settled. LFTICK is cleared
    /// once AMPSETTLED is set, so requiring a fresh LFTICK on top of
    /// FLTSETTLED rules that window out. Only relevant when running on LFOSC.
    fn is_lfinc_filter_allowing_standby(&self) -> bool {
        match self.lf_source() {
            LfSource::Lfosc => self.filter_settled() && self.lf_tick(),
            LfSource::Lfxt | LfSource::Extlf => true,
        }
    }
}

pub struct Ckmd {
    _ckmd: PhantomData<*const CkmdRegisters>,
}

impl Ckmd {
    /// # Safety
    ///
    /// Only one `Ckmd` may exist.
    pub(crate) const unsafe fn new() -> Self {
        Self { _ckmd: PhantomData }
    }

    fn regs() -> &'static CkmdRegisters {
        unsafe { &*(CKMD_BASE as *const CkmdRegisters) }
    }
}

impl LfClockStatus for Ckmd {
    fn lf_source(&self) -> LfSource {
        match Self::regs().lfclksel.read_as_enum(LFCLKSEL::MAIN) {
            Some(LFCLKSEL::MAIN::Value::Lfxt) => LfSource::Lfxt,
            Some(LFCLKSEL::MAIN::Value::Extlf) => LfSource::Extlf,
            _ => LfSource::Lfosc,
        }
    }

    #[inline]
    fn filter_settled(&self) -> bool {
        Self::regs().lfclkstat.is_set(LFCLKSTAT::FLTSETTLED)
    }

    #[inline]
    fn lf_tick(&self) -> bool {
        Self::regs().ris.is_set(INT::LFTICK)
    }
}

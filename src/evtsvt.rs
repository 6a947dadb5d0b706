//! Event fabric
//!
//! The CC23X0 has few interrupt lines, so CPUIRQ16 is shared between the
//! SysTimer and the RTC. The policy points it at the RTC for the duration of a
//! standby cycle and back at the SysTimer before interrupts are enabled again.
//! The clock service ISR stays registered on the line the whole time.

use core::marker::PhantomData;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::memmap::EVTSVT_BASE;

register_structs! {
    pub EvtSvtRegisters {
        (0x000 => _reserved0),
        (0x0C0 => cpuirq16sel: ReadWrite<u32, CPUIRQSEL::Register>),
        (0x0C4 => @END),
    }
}

register_bitfields![u32,
    CPUIRQSEL [
        PUBID OFFSET(0) NUMBITS(8) [
            None = 0x00,
            AonRtcComb = 0x0B,
            SysTim0 = 0x13
        ]
    ]
];

/// Event publishers that may drive CPUIRQ16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publisher {
    SysTimer0,
    AonRtcComb,
}

/// Subscriber side of the event fabric.
pub trait EventRouting {
    /// Bind CPUIRQ16 to `publisher`.
    fn route_cpuirq16(&self, publisher: Publisher);

    /// Publisher currently bound to CPUIRQ16, if it is one of ours.
    fn cpuirq16_route(&self) -> Option<Publisher>;
}

pub struct EventFabric {
    _evtsvt: PhantomData<*const EvtSvtRegisters>,
}

impl EventFabric {
    /// # Safety
    ///
    /// Only one `EventFabric` may exist.
    pub(crate) const unsafe fn new() -> Self {
        Self {
            _evtsvt: PhantomData,
        }
    }

    fn regs() -> &'static EvtSvtRegisters {
        unsafe { &*(EVTSVT_BASE as *const EvtSvtRegisters) }
    }
}

impl EventRouting for EventFabric {
    #[inline]
    fn route_cpuirq16(&self, publisher: Publisher) {
        let pubid = match publisher {
            Publisher::SysTimer0 => CPUIRQSEL::PUBID::SysTim0,
            Publisher::AonRtcComb => CPUIRQSEL::PUBID::AonRtcComb,
        };
        Self::regs().cpuirq16sel.write(pubid);
    }

    fn cpuirq16_route(&self) -> Option<Publisher> {
        match Self::regs().cpuirq16sel.read_as_enum(CPUIRQSEL::PUBID) {
            Some(CPUIRQSEL::PUBID::Value::SysTim0) => Some(Publisher::SysTimer0),
            Some(CPUIRQSEL::PUBID::Value::AonRtcComb) => Some(Publisher::AonRtcComb),
            _ => None,
        }
    }
}

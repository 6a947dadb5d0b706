//! Peripheral base addresses.

pub const EVTSVT_BASE: usize = 0x4000_1000;
pub const RTC_BASE: usize = 0x4000_2000;
pub const SYSTIM_BASE: usize = 0x4000_4000;
pub const CKMD_BASE: usize = 0x4008_C000;

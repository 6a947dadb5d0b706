//! This crate defines the HAL and tickless standby power policy for the
//! CC23X0.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod memmap;

pub mod chip;
pub mod ckmd;
pub mod evtsvt;
pub mod power;
pub mod rtc;
pub mod systick;
pub mod systim;

#[cfg(test)]
mod mock;

pub use chip::{Cc23x0, Interrupt};

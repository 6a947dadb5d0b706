//! Power constraints
//!
//! Drivers and applications declare which low power states they cannot
//! tolerate. Constraints are reference counted: every `set` needs a matching
//! `release` before the state is allowed again.

use core::cell::RefCell;

use cortex_m::interrupt::{CriticalSection, Mutex};
use paste::paste;

use super::PowerError;

/// Set of active constraints, one bit per [`Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstraintMask(u32);

impl ConstraintMask {
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, constraint: Constraint) -> bool {
        self.0 & constraint.mask() != 0
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    mask: u32,
    counts: [u8; NUM_CONSTRAINTS],
}

/// Reference counted constraint registry.
pub struct ConstraintRegistry {
    state: Mutex<RefCell<State>>,
}

impl ConstraintRegistry {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                mask: 0,
                counts: [0; NUM_CONSTRAINTS],
            })),
        }
    }

    /// Declare `constraint`.
    pub fn set(&self, cs: &CriticalSection, constraint: Constraint) -> Result<(), PowerError> {
        let mut state = self.state.borrow(cs).borrow_mut();
        let count = &mut state.counts[constraint.index()];
        *count = count.checked_add(1).ok_or(PowerError::InvalidInput)?;
        state.mask |= constraint.mask();
        Ok(())
    }

    /// Drop one reference to `constraint`. The constraint is lifted once every
    /// `set` has been released.
    pub fn release(&self, cs: &CriticalSection, constraint: Constraint) -> Result<(), PowerError> {
        let mut state = self.state.borrow(cs).borrow_mut();
        let count = &mut state.counts[constraint.index()];
        *count = count.checked_sub(1).ok_or(PowerError::InvalidInput)?;
        if *count == 0 {
            state.mask &= !constraint.mask();
        }
        Ok(())
    }

    pub fn mask(&self, cs: &CriticalSection) -> ConstraintMask {
        ConstraintMask(self.state.borrow(cs).borrow().mask)
    }

    pub fn count(&self, cs: &CriticalSection, constraint: Constraint) -> u8 {
        self.state.borrow(cs).borrow().counts[constraint.index()]
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_constraints {
    ([$(($name:ident = $bit:literal, $short:ident)),+ $(,)?]) => {
        paste! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Constraint {
            $($name = $bit,)+
        }

        pub const NUM_CONSTRAINTS: usize = [$(Constraint::$name),+].len();

        impl Constraint {
            pub const ALL: [Constraint; NUM_CONSTRAINTS] = [$(Constraint::$name),+];

            pub const fn index(self) -> usize {
                self as usize
            }

            pub const fn mask(self) -> u32 {
                1 << (self as u32)
            }
        }

        impl ConstraintRegistry {
            $(
            #[inline]
            pub fn [<disallow_ $short>](&self, cs: &CriticalSection) -> Result<(), PowerError> {
                self.set(cs, Constraint::$name)
            }

            #[inline]
            pub fn [<allow_ $short>](&self, cs: &CriticalSection) -> Result<(), PowerError> {
                self.release(cs, Constraint::$name)
            }
            )+
        }
        }
    };
}

impl_constraints!([
    (DisallowShutdown = 0, shutdown),
    (DisallowStandby = 1, standby),
    (DisallowIdle = 2, idle),
    (NeedFlashInIdle = 3, flash_off_in_idle),
    (DisallowSwtcxo = 4, swtcxo),
]);

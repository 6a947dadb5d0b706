//! Power event notifications
//!
//! Drivers that need to act around a power transition register a callback
//! for the events they care about. Clients are notified in registration
//! order.

use core::cell::RefCell;
use core::ops::BitOr;

use cortex_m::interrupt::{CriticalSection, Mutex};

use super::PowerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    EnteringStandby = 0x1,
    EnteringShutdown = 0x2,
    AwakeStandby = 0x4,
    HfxtAvailable = 0x8,
    LfclkSwitched = 0x10,
}

/// Set of [`PowerEvent`]s a client listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMask(u32);

impl EventMask {
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, event: PowerEvent) -> bool {
        self.0 & event as u32 != 0
    }
}

impl From<PowerEvent> for EventMask {
    fn from(event: PowerEvent) -> Self {
        EventMask(event as u32)
    }
}

impl BitOr for PowerEvent {
    type Output = EventMask;

    fn bitor(self, rhs: Self) -> EventMask {
        EventMask(self as u32 | rhs as u32)
    }
}

impl BitOr<PowerEvent> for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: PowerEvent) -> EventMask {
        EventMask(self.0 | rhs as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStatus {
    Done,
    Error,
}

/// Client callback. The second argument is the value given at registration.
pub type NotifyFn = fn(PowerEvent, usize) -> NotifyStatus;

/// Identifies a registered client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyHandle(u32);

#[derive(Clone, Copy)]
struct Client {
    id: u32,
    events: EventMask,
    notify_fn: NotifyFn,
    client_arg: usize,
}

struct Clients<const N: usize> {
    slots: [Option<Client>; N],
    len: usize,
    next_id: u32,
}

/// Fixed capacity list of notification clients.
pub struct NotifyRegistry<const N: usize> {
    clients: Mutex<RefCell<Clients<N>>>,
}

impl<const N: usize> NotifyRegistry<N> {
    pub const fn new() -> Self {
        Self {
            clients: Mutex::new(RefCell::new(Clients {
                slots: [None; N],
                len: 0,
                next_id: 0,
            })),
        }
    }

    /// Register `notify_fn` for every event in `events`.
    pub fn register(
        &self,
        cs: &CriticalSection,
        events: impl Into<EventMask>,
        notify_fn: NotifyFn,
        client_arg: usize,
    ) -> Result<NotifyHandle, PowerError> {
        let mut clients = self.clients.borrow(cs).borrow_mut();
        if clients.len == N {
            return Err(PowerError::RegistryFull);
        }

        let id = clients.next_id;
        clients.next_id = id.wrapping_add(1);
        let len = clients.len;
        clients.slots[len] = Some(Client {
            id,
            events: events.into(),
            notify_fn,
            client_arg,
        });
        clients.len += 1;

        Ok(NotifyHandle(id))
    }

    pub fn unregister(&self, cs: &CriticalSection, handle: NotifyHandle) -> Result<(), PowerError> {
        let mut clients = self.clients.borrow(cs).borrow_mut();
        let len = clients.len;
        let index = clients.slots[..len]
            .iter()
            .position(|slot| matches!(slot, Some(client) if client.id == handle.0))
            .ok_or(PowerError::NotRegistered)?;

        // Keep the remaining clients in registration order.
        clients.slots[index..len].rotate_left(1);
        clients.slots[len - 1] = None;
        clients.len -= 1;

        Ok(())
    }

    pub fn len(&self, cs: &CriticalSection) -> usize {
        self.clients.borrow(cs).borrow().len
    }

    pub fn is_empty(&self, cs: &CriticalSection) -> bool {
        self.len(cs) == 0
    }

    /// Notify every client listening to `event`.
    ///
    /// Stops at the first client that returns [`NotifyStatus::Error`].
    pub fn notify(&self, cs: &CriticalSection, event: PowerEvent) -> Result<(), PowerError> {
        // Copy the list out so clients may (un)register from the callback.
        let (slots, len) = {
            let clients = self.clients.borrow(cs).borrow();
            (clients.slots, clients.len)
        };

        for client in slots[..len].iter().flatten() {
            if client.events.contains(event)
                && (client.notify_fn)(event, client.client_arg) == NotifyStatus::Error
            {
                log_warn!("notify: client {} failed on {:?}", client.id, event);
                return Err(PowerError::NotifyFailed);
            }
        }

        Ok(())
    }
}

impl<const N: usize> Default for NotifyRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    std::thread_local! {
        static CALLS: RefCell<Vec<(PowerEvent, usize)>> = RefCell::new(Vec::new());
    }

    fn calls() -> Vec<(PowerEvent, usize)> {
        CALLS.with(|calls| calls.borrow().clone())
    }

    fn record(event: PowerEvent, arg: usize) -> NotifyStatus {
        CALLS.with(|calls| calls.borrow_mut().push((event, arg)));
        NotifyStatus::Done
    }

    fn record_and_fail(event: PowerEvent, arg: usize) -> NotifyStatus {
        record(event, arg);
        NotifyStatus::Error
    }

    fn cs() -> CriticalSection {
        unsafe { CriticalSection::new() }
    }

    #[test]
    fn clients_are_notified_in_registration_order() {
        let cs = cs();
        let registry = NotifyRegistry::<4>::new();
        registry
            .register(&cs, PowerEvent::EnteringStandby | PowerEvent::AwakeStandby, record, 1)
            .unwrap();
        registry.register(&cs, PowerEvent::AwakeStandby, record, 2).unwrap();
        registry.register(&cs, PowerEvent::EnteringStandby, record, 3).unwrap();

        registry.notify(&cs, PowerEvent::EnteringStandby).unwrap();
        registry.notify(&cs, PowerEvent::AwakeStandby).unwrap();

        assert_eq!(
            calls(),
            [
                (PowerEvent::EnteringStandby, 1),
                (PowerEvent::EnteringStandby, 3),
                (PowerEvent::AwakeStandby, 1),
                (PowerEvent::AwakeStandby, 2),
            ]
        );
    }

    #[test]
    fn failing_client_stops_the_walk() {
        let cs = cs();
        let registry = NotifyRegistry::<4>::new();
        registry.register(&cs, PowerEvent::EnteringStandby, record, 1).unwrap();
        registry
            .register(&cs, PowerEvent::EnteringStandby, record_and_fail, 2)
            .unwrap();
        registry.register(&cs, PowerEvent::EnteringStandby, record, 3).unwrap();

        assert!(matches!(
            registry.notify(&cs, PowerEvent::EnteringStandby),
            Err(PowerError::NotifyFailed)
        ));
        assert_eq!(
            calls(),
            [(PowerEvent::EnteringStandby, 1), (PowerEvent::EnteringStandby, 2)]
        );
    }

    #[test]
    fn registry_capacity() {
        let cs = cs();
        let registry = NotifyRegistry::<2>::new();
        let first = registry.register(&cs, PowerEvent::LfclkSwitched, record, 0).unwrap();
        registry.register(&cs, PowerEvent::LfclkSwitched, record, 0).unwrap();

        assert!(matches!(
            registry.register(&cs, PowerEvent::LfclkSwitched, record, 0),
            Err(PowerError::RegistryFull)
        ));

        registry.unregister(&cs, first).unwrap();
        assert_eq!(registry.len(&cs), 1);
        assert!(registry.register(&cs, PowerEvent::LfclkSwitched, record, 0).is_ok());
    }

    #[test]
    fn unregister_keeps_order() {
        let cs = cs();
        let registry = NotifyRegistry::<4>::new();
        registry.register(&cs, PowerEvent::HfxtAvailable, record, 1).unwrap();
        let second = registry.register(&cs, PowerEvent::HfxtAvailable, record, 2).unwrap();
        registry.register(&cs, PowerEvent::HfxtAvailable, record, 3).unwrap();

        registry.unregister(&cs, second).unwrap();
        assert!(matches!(
            registry.unregister(&cs, second),
            Err(PowerError::NotRegistered)
        ));

        registry.notify(&cs, PowerEvent::HfxtAvailable).unwrap();
        assert_eq!(
            calls(),
            [(PowerEvent::HfxtAvailable, 1), (PowerEvent::HfxtAvailable, 3)]
        );
    }

    #[test]
    fn empty_registry() {
        let cs = cs();
        let registry = NotifyRegistry::<1>::new();
        assert!(registry.is_empty(&cs));
        assert!(registry.notify(&cs, PowerEvent::EnteringShutdown).is_ok());
    }
}

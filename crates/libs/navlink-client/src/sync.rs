//! Synchronous-call completion bridge.
//!
//! Some service calls answer through the event path rather than the RPC
//! reply. A caller arms an expectation before issuing such a call, blocks on
//! it, and the router wakes it when a matching event is routed, before the
//! registered sink ever sees the event.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use navlink_api::{EventMask, EventPayload, NavError, SessionHandle};

/// Observer the router hands every routed event, ahead of sink invocation.
pub trait SyncCallBridge: Send + Sync {
    fn observe(&self, session: SessionHandle, events: EventMask, payload: &EventPayload);
}

#[derive(Clone, Copy)]
struct Pending {
    session: SessionHandle,
    events: EventMask,
    armed: bool,
    fulfilled: bool,
}

impl Pending {
    const IDLE: Pending = Pending {
        session: SessionHandle(0),
        events: EventMask::EMPTY,
        armed: false,
        fulfilled: false,
    };
}

/// Token for one armed expectation.
#[derive(Debug)]
pub struct WaitTicket {
    index: usize,
}

/// Condvar-backed implementation of [`SyncCallBridge`].
///
/// Expectation records live in a scan-allocated table like the registry
/// slots; a ticket is disarmed when its wait finishes, so the table never
/// grows past the number of concurrently blocked threads.
pub struct CallWaiter {
    pending: Mutex<Vec<Pending>>,
    wakeup: Condvar,
}

impl Default for CallWaiter {
    fn default() -> Self {
        Self::new()
    }
}

impl CallWaiter {
    pub fn new() -> Self {
        Self { pending: Mutex::new(Vec::new()), wakeup: Condvar::new() }
    }

    /// Arms an expectation for any event on `session` intersecting `events`.
    /// Must be called before the triggering request goes out.
    pub fn arm(&self, session: SessionHandle, events: EventMask) -> WaitTicket {
        let mut pending = self.pending.lock().expect("pending table mutex poisoned");
        let record = Pending { session, events, armed: true, fulfilled: false };

        for (index, entry) in pending.iter_mut().enumerate() {
            if !entry.armed {
                *entry = record;
                return WaitTicket { index };
            }
        }
        pending.push(record);
        WaitTicket { index: pending.len() - 1 }
    }

    /// Blocks until the armed expectation is fulfilled or `timeout` passes.
    /// The ticket is consumed either way.
    pub fn wait(&self, ticket: WaitTicket, timeout: Duration) -> Result<(), NavError> {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock().expect("pending table mutex poisoned");

        loop {
            if pending[ticket.index].fulfilled {
                pending[ticket.index] = Pending::IDLE;
                return Ok(());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                pending[ticket.index] = Pending::IDLE;
                return Err(NavError::timeout("synchronous call wait"));
            }
            let (guard, _) = self
                .wakeup
                .wait_timeout(pending, remaining)
                .expect("pending table mutex poisoned");
            pending = guard;
        }
    }

    /// Cancels an armed expectation without waiting, e.g. when the
    /// triggering request itself failed.
    pub fn disarm(&self, ticket: WaitTicket) {
        let mut pending = self.pending.lock().expect("pending table mutex poisoned");
        pending[ticket.index] = Pending::IDLE;
    }
}

impl SyncCallBridge for CallWaiter {
    fn observe(&self, session: SessionHandle, events: EventMask, _payload: &EventPayload) {
        let mut pending = self.pending.lock().expect("pending table mutex poisoned");
        let mut woke_any = false;
        for entry in pending.iter_mut() {
            if entry.armed && !entry.fulfilled && entry.session == session
                && entry.events.intersects(events)
            {
                entry.fulfilled = true;
                woke_any = true;
            }
        }
        if woke_any {
            self.wakeup.notify_all();
        }
    }
}

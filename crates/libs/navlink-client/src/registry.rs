//! Fixed-capacity callback registry and inbound event routing.
//!
//! One slot per registered sink, sixteen slots total, all scans and
//! mutations under a single mutex. The slot index travels to the remote
//! service inside the [`ClientId`] at open time and comes back on every
//! event delivery, which is how the router finds the right sink.

use std::sync::{Arc, Mutex};

use navlink_api::{
    ClientId, EventMask, EventPayload, EventRouter, EventSink, NavError, RouteOutcome,
    SessionHandle,
};

use crate::sync::SyncCallBridge;

/// Hard cap on concurrent registrations.
pub const MAX_CLIENTS: usize = 16;

struct Slot {
    id: ClientId,
    sink: Option<Arc<dyn EventSink>>,
    session: Option<SessionHandle>,
}

impl Slot {
    fn clear(&mut self) {
        self.sink = None;
        self.session = None;
    }
}

// Identity comparison on the data pointer only; comparing fat pointers
// would also compare vtable addresses, which are not unique.
fn same_sink(a: &Arc<dyn EventSink>, b: &Arc<dyn EventSink>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
}

/// Result of claiming a slot for a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Claim {
    /// A free slot was bound to the sink.
    New(usize),
    /// The sink was already registered; its existing slot is reused.
    Existing(usize),
}

impl Claim {
    pub fn index(self) -> usize {
        match self {
            Self::New(index) | Self::Existing(index) => index,
        }
    }
}

/// The slot arena. Also the [`EventRouter`] handed to the RPC runtime.
pub struct Registry {
    slots: Mutex<[Slot; MAX_CLIENTS]>,
    bridge: Option<Arc<dyn SyncCallBridge>>,
}

impl Registry {
    /// Builds an empty registry. `process_tag` lands in the upper half of
    /// every slot's [`ClientId`] so deliveries for a stale process never
    /// route into this one.
    pub fn new(process_tag: u16) -> Self {
        Self::with_bridge(process_tag, None)
    }

    pub fn with_bridge(process_tag: u16, bridge: Option<Arc<dyn SyncCallBridge>>) -> Self {
        let slots = std::array::from_fn(|index| Slot {
            id: ClientId::new(process_tag, index as u16),
            sink: None,
            session: None,
        });
        Self { slots: Mutex::new(slots), bridge }
    }

    /// Claims a slot for `sink`. A sink already registered (same `Arc`
    /// allocation) keeps its slot; otherwise the first free slot is bound.
    pub fn claim(&self, sink: Arc<dyn EventSink>) -> Result<Claim, NavError> {
        let mut slots = self.slots.lock().expect("slot table mutex poisoned");

        for (index, slot) in slots.iter().enumerate() {
            if let Some(bound) = &slot.sink {
                if same_sink(bound, &sink) {
                    log::warn!("sink already registered in slot {index}, reusing");
                    return Ok(Claim::Existing(index));
                }
            }
        }

        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.sink.is_none() {
                slot.sink = Some(sink);
                return Ok(Claim::New(index));
            }
        }

        log::error!("all {MAX_CLIENTS} registry slots are bound");
        Err(NavError::TooManyClients)
    }

    /// The identifier encoded into the remote open request for `index`.
    pub fn client_id(&self, index: usize) -> ClientId {
        self.slots.lock().expect("slot table mutex poisoned")[index].id
    }

    /// Stores the session handle the remote open returned for `index`.
    pub fn bind_session(&self, index: usize, session: SessionHandle) {
        self.slots.lock().expect("slot table mutex poisoned")[index].session = Some(session);
    }

    /// Frees the slot bound to `session`. Returns `false` when no slot
    /// holds that handle.
    pub fn release_session(&self, session: SessionHandle) -> bool {
        let mut slots = self.slots.lock().expect("slot table mutex poisoned");
        for slot in slots.iter_mut() {
            if slot.session == Some(session) {
                slot.clear();
                return true;
            }
        }
        false
    }

    /// Frees `index` unconditionally. Used to roll back a fresh claim when
    /// the remote open fails.
    pub fn release_index(&self, index: usize) {
        self.slots.lock().expect("slot table mutex poisoned")[index].clear();
    }

    /// Number of slots currently bound to a sink.
    pub fn active_clients(&self) -> usize {
        self.slots
            .lock()
            .expect("slot table mutex poisoned")
            .iter()
            .filter(|slot| slot.sink.is_some())
            .count()
    }
}

impl EventRouter for Registry {
    fn route(&self, client: ClientId, events: EventMask, payload: EventPayload) -> RouteOutcome {
        let index = client.slot_index();

        // Copy the sink and session out under the lock; invoke with the
        // lock released so a sink may call back into the registry.
        let (sink, session) = {
            let slots = self.slots.lock().expect("slot table mutex poisoned");
            if index >= MAX_CLIENTS {
                log::warn!("event for out-of-range slot {index}, dropping");
                return RouteOutcome::Dropped;
            }
            let slot = &slots[index];
            match (&slot.sink, slot.session) {
                (Some(sink), Some(session)) => (sink.clone(), session),
                (Some(_), None) => {
                    log::warn!("event for slot {index} with no bound session, dropping");
                    return RouteOutcome::Dropped;
                }
                (None, _) => {
                    log::warn!("event for unregistered slot {index}, dropping");
                    return RouteOutcome::Dropped;
                }
            }
        };

        // Unblock any thread waiting on a matching reply before the sink
        // sees the event.
        if let Some(bridge) = &self.bridge {
            bridge.observe(session, events, &payload);
        }

        let rc = sink.on_event(session, events, &payload);
        log::trace!("sink for slot {index} returned {rc}");
        RouteOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::{Claim, Registry, MAX_CLIENTS};
    use navlink_api::{
        ClientId, EventMask, EventPayload, EventRouter, EventSink, NavError, NmeaSentence,
        RouteOutcome, SessionHandle,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        calls: AtomicUsize,
    }

    impl CountingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0) })
        }
    }

    impl EventSink for CountingSink {
        fn on_event(
            &self,
            _session: SessionHandle,
            _events: EventMask,
            _payload: &EventPayload,
        ) -> i32 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            0
        }
    }

    fn nmea_payload() -> EventPayload {
        EventPayload::Nmea(NmeaSentence { sentence: "$GPGGA,...".to_owned() })
    }

    #[test]
    fn distinct_sinks_get_distinct_slots_until_capacity() {
        let registry = Registry::new(0x11);
        let mut seen = Vec::new();
        for _ in 0..MAX_CLIENTS {
            let claim = registry.claim(CountingSink::new()).expect("claim within capacity");
            let Claim::New(index) = claim else { panic!("expected a fresh slot") };
            assert!(!seen.contains(&index));
            seen.push(index);
        }
        let err = registry.claim(CountingSink::new()).expect_err("capacity exhausted");
        assert_eq!(err, NavError::TooManyClients);
    }

    #[test]
    fn same_sink_reuses_its_slot() {
        let registry = Registry::new(0x11);
        let sink = CountingSink::new();
        let first = registry.claim(sink.clone()).expect("first claim");
        let second = registry.claim(sink).expect("second claim");
        assert_eq!(second, Claim::Existing(first.index()));
        assert_eq!(registry.active_clients(), 1);
    }

    #[test]
    fn release_by_session_frees_the_slot() {
        let registry = Registry::new(0x11);
        let claim = registry.claim(CountingSink::new()).expect("claim");
        registry.bind_session(claim.index(), SessionHandle(42));
        assert!(registry.release_session(SessionHandle(42)));
        assert_eq!(registry.active_clients(), 0);
        assert!(!registry.release_session(SessionHandle(42)));
    }

    #[test]
    fn route_invokes_the_bound_sink() {
        let registry = Registry::new(0x11);
        let sink = CountingSink::new();
        let claim = registry.claim(sink.clone()).expect("claim");
        registry.bind_session(claim.index(), SessionHandle(7));

        let outcome = registry.route(
            registry.client_id(claim.index()),
            EventMask::NMEA_SENTENCE,
            nmea_payload(),
        );
        assert_eq!(outcome, RouteOutcome::Delivered);
        assert_eq!(sink.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unroutable_events_are_dropped_quietly() {
        let registry = Registry::new(0x11);

        // Never-allocated slot.
        let outcome = registry.route(ClientId::new(0x11, 3), EventMask::ALL, nmea_payload());
        assert_eq!(outcome, RouteOutcome::Dropped);

        // Out-of-range index.
        let outcome = registry.route(ClientId::new(0x11, 200), EventMask::ALL, nmea_payload());
        assert_eq!(outcome, RouteOutcome::Dropped);

        // Claimed but no session bound yet.
        let sink = CountingSink::new();
        let claim = registry.claim(sink.clone()).expect("claim");
        let outcome =
            registry.route(registry.client_id(claim.index()), EventMask::ALL, nmea_payload());
        assert_eq!(outcome, RouteOutcome::Dropped);
        assert_eq!(sink.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn freed_slot_no_longer_routes() {
        let registry = Registry::new(0x11);
        let sink = CountingSink::new();
        let claim = registry.claim(sink.clone()).expect("claim");
        registry.bind_session(claim.index(), SessionHandle(5));
        let id = registry.client_id(claim.index());
        assert!(registry.release_session(SessionHandle(5)));

        let outcome = registry.route(id, EventMask::ALL, nmea_payload());
        assert_eq!(outcome, RouteOutcome::Dropped);
        assert_eq!(sink.calls.load(Ordering::Relaxed), 0);
    }
}

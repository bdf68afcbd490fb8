//! Seams between the glue layer, the RPC runtime, and application callbacks.

use std::sync::Arc;

use crate::error::NavError;
use crate::types::{ApiVersion, ClientId, EventMask, EventPayload, SessionHandle};
use crate::wire::{RemoteCall, RemoteReply};

/// One established connection to the positioning service.
///
/// The implementation is the external RPC stub runtime; navlink only calls
/// it. A failed call surfaces as [`NavError::Transport`] regardless of the
/// underlying cause.
pub trait RpcChannel: Send + Sync {
    fn invoke(&self, version: ApiVersion, call: RemoteCall) -> Result<RemoteReply, NavError>;
}

/// Connection factory plus the one-time callback-subsystem hookup.
///
/// `register_router` hands the RPC runtime the surface it must call when the
/// service delivers an event; it is invoked once per successful
/// initialization, before the channel is published.
pub trait RpcConnector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn RpcChannel>, NavError>;

    fn register_router(&self, router: Arc<dyn EventRouter>) -> Result<(), NavError>;
}

/// Application callback registered at `open`.
///
/// Invoked synchronously on the routing context. The returned code is logged
/// by the dispatcher but not propagated upstream.
pub trait EventSink: Send + Sync {
    fn on_event(&self, session: SessionHandle, events: EventMask, payload: &EventPayload) -> i32;
}

/// Outcome of routing one inbound delivery. Both variants are benign to the
/// RPC layer: an unroutable event is dropped, never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered,
    Dropped,
}

/// Inbound delivery surface the RPC runtime calls on its own context when
/// the service pushes an event.
pub trait EventRouter: Send + Sync {
    fn route(&self, client: ClientId, events: EventMask, payload: EventPayload) -> RouteOutcome;
}

//! Boundary contract for the navlink positioning glue.
//!
//! This crate defines the contract between the navlink client glue and its
//! two external collaborators — the RPC stub runtime that reaches the remote
//! positioning service, and the application code consuming events. It
//! provides:
//!
//! - **Domain types** — session handles, client identifiers, event masks and
//!   payloads, service result codes
//! - **Wire model** — [`RemoteCall`]/[`RemoteReply`], one generic versioned
//!   invoke instead of per-version forwarder sets
//! - **Trait seams** — [`RpcChannel`]/[`RpcConnector`] toward the transport,
//!   [`EventSink`]/[`EventRouter`] toward applications
//! - **`NavError`** — the glue-level error taxonomy
//! - **`StubChannel`** failing every call, for stub-first development

pub mod error;
pub mod ioctl;
pub mod traits;
pub mod types;
pub mod wire;

pub use error::NavError;
pub use ioctl::{
    AddressEndpoint, AddressTransport, AssistDataFilter, EngineLockMode, FixCriteria,
    FixRecurrence, IoctlKind, IoctlPayload, NiResponse, NiUserResponse, PositionInjection,
    PredictedOrbitsBlock, ServerAddress,
};
pub use traits::{EventRouter, EventSink, RouteOutcome, RpcChannel, RpcConnector};
pub use types::{
    ApiVersion, ClientId, EngineState, EventMask, EventPayload, FixSessionState, NiNotification,
    NmeaSentence, PositionReport, SatelliteReport, ServiceStatus, SessionHandle,
};
pub use wire::{
    IoctlRequest, OpenReply, OpenRequest, Procedure, RemoteCall, RemoteReply, SessionRequest,
    StatusReply,
};

mod stub;
pub use stub::{StubChannel, StubConnector};

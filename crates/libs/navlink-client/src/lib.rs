//! Navlink client glue.
//!
//! The layer between the application-facing positioning API and the RPC
//! transport reaching the remote positioning service. It marshals outbound
//! calls onto one shared channel and routes asynchronous event deliveries
//! back to the registered sink:
//!
//! - [`Registry`] — fixed-capacity slot table (16 clients), one mutex, slot
//!   index encoded in the wire-visible client identifier
//! - [`Client`] — the public call surface: `initialize`, `open`, `close`,
//!   `start_fix`, `stop_fix`, `ioctl`, `null_probe`
//! - [`CallWaiter`] — synchronous-call completion bridge fed by the router
//!   ahead of sink invocation
//!
//! The RPC runtime itself (encoding, transport, server-side dispatch) is an
//! external collaborator reached through the `navlink-api` trait seams.

pub mod client;
pub mod registry;
pub mod sync;

pub use client::Client;
pub use registry::{Claim, Registry, MAX_CLIENTS};
pub use sync::{CallWaiter, SyncCallBridge, WaitTicket};

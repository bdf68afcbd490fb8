//! Public call surface: one shared channel, forwarders per procedure.

use std::sync::{Arc, Mutex};

use navlink_api::{
    ApiVersion, EventMask, EventRouter, EventSink, IoctlKind, IoctlPayload, IoctlRequest,
    NavError, OpenRequest, Procedure, RemoteCall, RemoteReply, RpcChannel, RpcConnector,
    ServiceStatus, SessionHandle, SessionRequest,
};

use crate::registry::{Claim, Registry};
use crate::sync::SyncCallBridge;

/// Client glue over a connector `C`.
///
/// Holds the shared channel to the positioning service and the callback
/// registry. All methods take `&self`; internal state lives behind mutexes,
/// so a `Client` can be shared across threads as-is.
pub struct Client<C: RpcConnector> {
    connector: C,
    version: ApiVersion,
    registry: Arc<Registry>,
    channel: Mutex<Option<Arc<dyn RpcChannel>>>,
}

impl<C: RpcConnector> Client<C> {
    /// Builds a client with no synchronous-call bridge, speaking
    /// [`ApiVersion::CURRENT`].
    pub fn new(connector: C) -> Self {
        Self::with_bridge(connector, None)
    }

    pub fn with_bridge(connector: C, bridge: Option<Arc<dyn SyncCallBridge>>) -> Self {
        let process_tag = std::process::id() as u16;
        Self {
            connector,
            version: ApiVersion::CURRENT,
            registry: Arc::new(Registry::with_bridge(process_tag, bridge)),
            channel: Mutex::new(None),
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// The routing surface to hand the RPC runtime (also registered through
    /// the connector during [`Client::initialize`]).
    pub fn router(&self) -> Arc<dyn EventRouter> {
        self.registry.clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Establishes the shared channel and hooks up inbound routing.
    ///
    /// Idempotent: a no-op when the channel is already up. On any failure
    /// the channel stays unset, so a later call retries from scratch.
    pub fn initialize(&self) -> Result<(), NavError> {
        let mut channel = self.channel.lock().expect("channel mutex poisoned");
        if channel.is_some() {
            return Ok(());
        }

        let connected = self.connector.connect()?;
        self.connector.register_router(self.registry.clone())?;

        log::debug!(
            "navlink channel established at v{}.{}",
            self.version.major,
            self.version.minor
        );
        *channel = Some(connected);
        Ok(())
    }

    fn channel(&self) -> Result<Arc<dyn RpcChannel>, NavError> {
        self.channel
            .lock()
            .expect("channel mutex poisoned")
            .clone()
            .ok_or(NavError::NotInitialized)
    }

    /// Registers `sink` and opens a session with the service.
    ///
    /// The claimed slot's identifier travels in the open request; the
    /// service echoes it on every event so the router can find `sink`. A
    /// sink that is already registered keeps its slot and the stored handle
    /// is replaced. If the remote call fails, a freshly claimed slot is
    /// released again.
    pub fn open(
        &self,
        events: EventMask,
        sink: Arc<dyn EventSink>,
    ) -> Result<SessionHandle, NavError> {
        let channel = self.channel()?;
        let claim = self.registry.claim(sink)?;
        let client = self.registry.client_id(claim.index());

        let result = channel
            .invoke(self.version, RemoteCall::Open(OpenRequest { client, events }))
            .and_then(|reply| match reply {
                RemoteReply::Open(open) => Ok(open.handle),
                other => Err(mismatched(Procedure::Open, &other)),
            });

        match result {
            Ok(handle) => {
                self.registry.bind_session(claim.index(), handle);
                Ok(handle)
            }
            Err(err) => {
                if let Claim::New(index) = claim {
                    self.registry.release_index(index);
                }
                Err(err)
            }
        }
    }

    /// Closes `handle` and frees its slot.
    ///
    /// The remote close is issued regardless of local state; a handle
    /// missing from the table is logged, not an error. A successful close
    /// tears the shared channel down entirely, so the next call fails
    /// `NotInitialized` until [`Client::initialize`] runs again.
    pub fn close(&self, handle: SessionHandle) -> Result<ServiceStatus, NavError> {
        let channel = self.channel()?;
        let result =
            channel.invoke(self.version, RemoteCall::Close(SessionRequest { session: handle }));

        if !self.registry.release_session(handle) {
            log::warn!("close: no registered client for session {}", handle.0);
        }

        // Transport failure: report it, keep the channel for other sessions.
        let status = match result? {
            RemoteReply::Close(reply) => reply.status,
            other => return Err(mismatched(Procedure::Close, &other)),
        };

        let mut guard = self.channel.lock().expect("channel mutex poisoned");
        *guard = None;
        log::debug!("navlink channel torn down after close of session {}", handle.0);
        Ok(status)
    }

    pub fn start_fix(&self, handle: SessionHandle) -> Result<ServiceStatus, NavError> {
        let reply = self
            .channel()?
            .invoke(self.version, RemoteCall::StartFix(SessionRequest { session: handle }))?;
        match reply {
            RemoteReply::StartFix(reply) => Ok(reply.status),
            other => Err(mismatched(Procedure::StartFix, &other)),
        }
    }

    pub fn stop_fix(&self, handle: SessionHandle) -> Result<ServiceStatus, NavError> {
        let reply = self
            .channel()?
            .invoke(self.version, RemoteCall::StopFix(SessionRequest { session: handle }))?;
        match reply {
            RemoteReply::StopFix(reply) => Ok(reply.status),
            other => Err(mismatched(Procedure::StopFix, &other)),
        }
    }

    /// Configure-or-query call. Server-address SET kinds get their address
    /// payload's primary discriminator overwritten to mirror the endpoint
    /// variant before the request goes out; the remote encoding requires
    /// both to agree.
    pub fn ioctl(
        &self,
        handle: SessionHandle,
        kind: IoctlKind,
        payload: Option<IoctlPayload>,
    ) -> Result<ServiceStatus, NavError> {
        let channel = self.channel()?;
        let payload = normalize_ioctl(kind, payload)?;
        let reply = channel.invoke(
            self.version,
            RemoteCall::Ioctl(IoctlRequest { session: handle, kind, payload }),
        )?;
        match reply {
            RemoteReply::Ioctl(reply) => Ok(reply.status),
            other => Err(mismatched(Procedure::Ioctl, &other)),
        }
    }

    /// Liveness probe against the service; carries no session.
    pub fn null_probe(&self) -> Result<ServiceStatus, NavError> {
        let reply = self.channel()?.invoke(self.version, RemoteCall::NullProbe)?;
        match reply {
            RemoteReply::NullProbe(reply) => Ok(reply.status),
            other => Err(mismatched(Procedure::NullProbe, &other)),
        }
    }
}

fn mismatched(expected: Procedure, got: &RemoteReply) -> NavError {
    NavError::rejected(format!(
        "reply to {:?} answered procedure {:?}",
        expected,
        got.procedure()
    ))
}

fn normalize_ioctl(
    kind: IoctlKind,
    payload: Option<IoctlPayload>,
) -> Result<Option<IoctlPayload>, NavError> {
    if kind.is_server_address_set() {
        return match payload {
            Some(IoctlPayload::ServerAddress(mut address)) => {
                address.transport = address.endpoint.transport();
                Ok(Some(IoctlPayload::ServerAddress(address)))
            }
            _ => Err(NavError::rejected(format!(
                "{kind:?} requires a server-address payload"
            ))),
        };
    }
    if matches!(payload, Some(IoctlPayload::ServerAddress(_))) {
        return Err(NavError::rejected(format!(
            "server-address payload is invalid for {kind:?}"
        )));
    }
    Ok(payload)
}

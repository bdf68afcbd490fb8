use std::sync::Arc;

use crate::error::NavError;
use crate::traits::{EventRouter, RpcChannel, RpcConnector};
use crate::types::ApiVersion;
use crate::wire::{RemoteCall, RemoteReply};

/// A channel with no remote service behind it: every call fails with a
/// transport error.
///
/// This is the starting point for stub-first development: wire it into a
/// client, then swap in the real RPC runtime binding.
pub struct StubChannel;

impl RpcChannel for StubChannel {
    fn invoke(&self, _version: ApiVersion, call: RemoteCall) -> Result<RemoteReply, NavError> {
        Err(NavError::transport(format!(
            "stub channel: {:?} has no remote service",
            call.procedure()
        )))
    }
}

/// Connector yielding a [`StubChannel`] and accepting any router.
pub struct StubConnector;

impl RpcConnector for StubConnector {
    fn connect(&self) -> Result<Arc<dyn RpcChannel>, NavError> {
        Ok(Arc::new(StubChannel))
    }

    fn register_router(&self, _router: Arc<dyn EventRouter>) -> Result<(), NavError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{StubChannel, StubConnector};
    use crate::error::NavError;
    use crate::traits::{RpcChannel, RpcConnector};
    use crate::types::ApiVersion;
    use crate::wire::RemoteCall;

    #[test]
    fn stub_channel_fails_every_call() {
        let channel = StubChannel;
        let err = channel
            .invoke(ApiVersion::CURRENT, RemoteCall::NullProbe)
            .expect_err("stub must not answer");
        assert!(matches!(err, NavError::Transport { .. }));
    }

    #[test]
    fn stub_connector_yields_a_channel() {
        let connector = StubConnector;
        assert!(connector.connect().is_ok());
    }
}

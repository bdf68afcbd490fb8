//! Request/reply model for the remote procedures.
//!
//! One generic "invoke procedure at version v" operation replaces the
//! original interface's per-version forwarder set: callers build a
//! [`RemoteCall`], the channel answers with the mirroring [`RemoteReply`].

use serde::{Deserialize, Serialize};

use crate::ioctl::{IoctlKind, IoctlPayload};
use crate::types::{ClientId, EventMask, ServiceStatus, SessionHandle};

/// Identifier of a remote procedure.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    Open,
    Close,
    StartFix,
    StopFix,
    Ioctl,
    NullProbe,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenRequest {
    pub client: ClientId,
    pub events: EventMask,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRequest {
    pub session: SessionHandle,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IoctlRequest {
    pub session: SessionHandle,
    pub kind: IoctlKind,
    pub payload: Option<IoctlPayload>,
}

/// Outbound request, one variant per procedure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCall {
    Open(OpenRequest),
    Close(SessionRequest),
    StartFix(SessionRequest),
    StopFix(SessionRequest),
    Ioctl(IoctlRequest),
    NullProbe,
}

impl RemoteCall {
    pub fn procedure(&self) -> Procedure {
        match self {
            Self::Open(_) => Procedure::Open,
            Self::Close(_) => Procedure::Close,
            Self::StartFix(_) => Procedure::StartFix,
            Self::StopFix(_) => Procedure::StopFix,
            Self::Ioctl(_) => Procedure::Ioctl,
            Self::NullProbe => Procedure::NullProbe,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenReply {
    pub handle: SessionHandle,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusReply {
    pub status: ServiceStatus,
}

/// Inbound reply, mirroring [`RemoteCall`] variant for variant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteReply {
    Open(OpenReply),
    Close(StatusReply),
    StartFix(StatusReply),
    StopFix(StatusReply),
    Ioctl(StatusReply),
    NullProbe(StatusReply),
}

impl RemoteReply {
    pub fn procedure(&self) -> Procedure {
        match self {
            Self::Open(_) => Procedure::Open,
            Self::Close(_) => Procedure::Close,
            Self::StartFix(_) => Procedure::StartFix,
            Self::StopFix(_) => Procedure::StopFix,
            Self::Ioctl(_) => Procedure::Ioctl,
            Self::NullProbe(_) => Procedure::NullProbe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        OpenRequest, Procedure, RemoteCall, RemoteReply, SessionRequest, StatusReply,
    };
    use crate::types::{ClientId, EventMask, ServiceStatus, SessionHandle};

    #[test]
    fn call_and_reply_name_their_procedure() {
        let call = RemoteCall::Open(OpenRequest {
            client: ClientId::new(1, 0),
            events: EventMask::POSITION_REPORT,
        });
        assert_eq!(call.procedure(), Procedure::Open);
        assert_eq!(RemoteCall::NullProbe.procedure(), Procedure::NullProbe);

        let reply = RemoteReply::StopFix(StatusReply { status: ServiceStatus::Success });
        assert_eq!(reply.procedure(), Procedure::StopFix);
    }

    #[test]
    fn session_request_serializes_transparently() {
        let req = SessionRequest { session: SessionHandle(9) };
        let json = serde_json::to_value(req).expect("serialize session request");
        assert_eq!(json["session"], 9);
    }
}

//! Typed model of the service's configure/query ("ioctl") surface.
//!
//! The remote encoding carries a request-kind discriminator plus a payload
//! union; for the server-address kinds a secondary discriminator inside the
//! address body must agree with the primary one. [`AddressEndpoint::transport`]
//! derives the matching tag so the client can pre-fill it.

use serde::{Deserialize, Serialize};

/// Request-kind discriminator for the configure/query surface.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IoctlKind {
    GetApiVersion,
    SetFixCriteria,
    GetFixCriteria,
    InformNiUserResponse,
    InjectPredictedOrbits,
    QueryPredictedOrbitsValidity,
    QueryPredictedOrbitsSource,
    SetPredictedOrbitsAutoDownload,
    InjectUtcTime,
    InjectRtcValue,
    InjectPosition,
    QueryEngineState,
    InformServerOpenStatus,
    InformServerCloseStatus,
    SetEngineLock,
    GetEngineLock,
    SetSbasConfig,
    GetSbasConfig,
    SetNmeaTypes,
    GetNmeaTypes,
    SetCdmaPdeServerAddress,
    SetCdmaMpcServerAddress,
    SetUmtsSlpServerAddress,
    SetCustomPdeServerAddress,
    GetCdmaPdeServerAddress,
    GetCdmaMpcServerAddress,
    GetUmtsSlpServerAddress,
    GetCustomPdeServerAddress,
    SetOnDemandLowPower,
    GetOnDemandLowPower,
    DeleteAssistData,
}

impl IoctlKind {
    /// The four kinds that configure an alternate server address and carry
    /// the doubly-discriminated [`ServerAddress`] payload.
    pub fn is_server_address_set(self) -> bool {
        matches!(
            self,
            Self::SetCdmaPdeServerAddress
                | Self::SetCdmaMpcServerAddress
                | Self::SetUmtsSlpServerAddress
                | Self::SetCustomPdeServerAddress
        )
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FixRecurrence {
    Single,
    Periodic,
}

/// Parameters controlling how fixes are produced once a session starts.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixCriteria {
    pub recurrence: FixRecurrence,
    pub interval_ms: u32,
    pub accuracy_m: u32,
    pub timeout_ms: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NiResponse {
    Accept,
    Deny,
    NoResponse,
}

/// User verdict for a network-initiated request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NiUserResponse {
    pub notification_id: u32,
    pub response: NiResponse,
}

/// One part of a predicted-orbits (XTRA-style) data file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictedOrbitsBlock {
    pub total_size: u32,
    pub part_number: u16,
    pub total_parts: u16,
    pub data: Vec<u8>,
}

/// Coarse position injected to speed up the first fix.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PositionInjection {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub horizontal_accuracy_m: f32,
    pub timestamp_ms: u64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineLockMode {
    Unlocked,
    MobileInitiated,
    MobileTerminated,
    All,
}

/// Bitmask selecting which cached assistance data to delete.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AssistDataFilter(pub u64);

// ── Server address ────────────────────────────────────────────────────────────

/// Wire discriminator for the address body. The remote encoding requires it
/// to agree with the [`AddressEndpoint`] variant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AddressTransport {
    Ipv4,
    Url,
}

/// Concrete address of an assistance server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AddressEndpoint {
    Ipv4 { address: u32, port: u16 },
    Url(String),
}

impl AddressEndpoint {
    /// The transport tag matching this endpoint variant.
    pub fn transport(&self) -> AddressTransport {
        match self {
            Self::Ipv4 { .. } => AddressTransport::Ipv4,
            Self::Url(_) => AddressTransport::Url,
        }
    }
}

/// Doubly-discriminated server address payload: `transport` is the primary
/// wire tag, `endpoint` carries its own. The client overwrites `transport`
/// from the endpoint before a server-address ioctl goes out.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerAddress {
    pub transport: AddressTransport,
    pub endpoint: AddressEndpoint,
}

impl ServerAddress {
    /// Builds an address with the transport tag derived from the endpoint.
    pub fn new(endpoint: AddressEndpoint) -> Self {
        Self { transport: endpoint.transport(), endpoint }
    }

    pub fn is_consistent(&self) -> bool {
        self.transport == self.endpoint.transport()
    }
}

/// Typed payload variant accompanying an [`IoctlKind`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IoctlPayload {
    FixCriteria(FixCriteria),
    UserResponse(NiUserResponse),
    PredictedOrbits(PredictedOrbitsBlock),
    UtcTime { timestamp_ms: u64, uncertainty_ms: u32 },
    RtcValue { milliseconds: u64, uncertainty_ms: u32 },
    Position(PositionInjection),
    EngineLock(EngineLockMode),
    SbasEnabled(bool),
    NmeaTypes(u32),
    ServerAddress(ServerAddress),
    OnDemandLowPower(bool),
    AssistData(AssistDataFilter),
}

#[cfg(test)]
mod tests {
    use super::{AddressEndpoint, AddressTransport, IoctlKind, IoctlPayload, ServerAddress};

    #[test]
    fn server_address_set_kinds() {
        assert!(IoctlKind::SetCdmaPdeServerAddress.is_server_address_set());
        assert!(IoctlKind::SetCdmaMpcServerAddress.is_server_address_set());
        assert!(IoctlKind::SetUmtsSlpServerAddress.is_server_address_set());
        assert!(IoctlKind::SetCustomPdeServerAddress.is_server_address_set());
        assert!(!IoctlKind::GetCdmaPdeServerAddress.is_server_address_set());
        assert!(!IoctlKind::SetFixCriteria.is_server_address_set());
    }

    #[test]
    fn time_injection_kinds_encode_beside_each_other() {
        assert!(!IoctlKind::InjectUtcTime.is_server_address_set());
        assert!(!IoctlKind::InjectRtcValue.is_server_address_set());

        let kind = serde_json::to_value(IoctlKind::InjectRtcValue).expect("serialize kind");
        assert_eq!(kind, "inject_rtc_value");

        let payload = IoctlPayload::RtcValue { milliseconds: 86_400_000, uncertainty_ms: 50 };
        let value = serde_json::to_value(payload).expect("serialize payload");
        assert_eq!(value["rtc_value"]["milliseconds"], 86_400_000);
        assert_eq!(value["rtc_value"]["uncertainty_ms"], 50);
    }

    #[test]
    fn endpoint_derives_matching_transport() {
        let ipv4 = AddressEndpoint::Ipv4 { address: 0x0A00_0001, port: 7275 };
        assert_eq!(ipv4.transport(), AddressTransport::Ipv4);
        let url = AddressEndpoint::Url("supl.example.net:7275".to_owned());
        assert_eq!(url.transport(), AddressTransport::Url);

        let addr = ServerAddress::new(url);
        assert!(addr.is_consistent());

        let skewed = ServerAddress {
            transport: AddressTransport::Ipv4,
            endpoint: AddressEndpoint::Url("supl.example.net".to_owned()),
        };
        assert!(!skewed.is_consistent());
    }
}

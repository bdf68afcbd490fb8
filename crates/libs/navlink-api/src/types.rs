use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

// ── Handles and identifiers ───────────────────────────────────────────────────

/// Opaque handle identifying one open registration with the remote
/// positioning service. Issued by the service on `open`, used as the key for
/// every subsequent call on that session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionHandle(pub i64);

/// Opaque client identifier sent to the remote service at open time and
/// echoed back on every event delivery.
///
/// The low 16 bits carry the registry slot index; the upper 16 bits carry a
/// process tag so deliveries for a stale process never route into a live one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClientId(u32);

impl ClientId {
    pub fn new(process_tag: u16, slot: u16) -> Self {
        Self((u32::from(process_tag) << 16) | u32::from(slot))
    }

    pub fn slot_index(self) -> usize {
        (self.0 & 0xFFFF) as usize
    }

    pub fn process_tag(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

// ── Event masks ───────────────────────────────────────────────────────────────

/// Bitmask of event classes a client registers for at `open` and that the
/// service stamps on each delivery.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EventMask(pub u64);

impl EventMask {
    pub const EMPTY: EventMask = EventMask(0);
    pub const POSITION_REPORT: EventMask = EventMask(1 << 0);
    pub const SATELLITE_REPORT: EventMask = EventMask(1 << 1);
    pub const NMEA_SENTENCE: EventMask = EventMask(1 << 2);
    pub const NI_NOTIFICATION: EventMask = EventMask(1 << 3);
    pub const ASSISTANCE_REQUEST: EventMask = EventMask(1 << 4);
    pub const ENGINE_STATE: EventMask = EventMask(1 << 5);
    pub const FIX_SESSION_STATE: EventMask = EventMask(1 << 6);
    pub const ALL: EventMask = EventMask(u64::MAX);

    pub fn contains(self, other: EventMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: EventMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventMask {
    fn bitor_assign(&mut self, rhs: EventMask) {
        self.0 |= rhs.0;
    }
}

// ── Event payloads ────────────────────────────────────────────────────────────

/// Position fix delivered by the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PositionReport {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed_mps: Option<f32>,
    pub heading_deg: Option<f32>,
    pub horizontal_accuracy_m: Option<f32>,
    pub timestamp_ms: u64,
}

/// Satellite visibility summary.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SatelliteReport {
    pub in_view: u8,
    pub used_in_fix: u8,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FixSessionState {
    Begin,
    End,
}

/// Raw NMEA sentence emitted by the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NmeaSentence {
    pub sentence: String,
}

/// Network-initiated request awaiting a user response.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NiNotification {
    pub notification_id: u32,
    pub requestor: String,
    pub text: String,
}

/// Body of one asynchronous event delivery.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventPayload {
    Position(PositionReport),
    Satellites(SatelliteReport),
    EngineState(EngineState),
    FixSession(FixSessionState),
    Nmea(NmeaSentence),
    NiNotification(NiNotification),
}

// ── Service status ────────────────────────────────────────────────────────────

/// Result code reported by the remote positioning service itself.
///
/// These are passed through to callers unchanged; only transport-level
/// failures become [`crate::error::NavError`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ServiceStatus {
    Success,
    GeneralFailure,
    Unsupported,
    InvalidHandle,
    InvalidParameter,
    EngineBusy,
    PhoneOffline,
    Timeout,
    Other(i32),
}

impl ServiceStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::GeneralFailure,
            2 => Self::Unsupported,
            3 => Self::InvalidHandle,
            4 => Self::InvalidParameter,
            5 => Self::EngineBusy,
            6 => Self::PhoneOffline,
            7 => Self::Timeout,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::GeneralFailure => 1,
            Self::Unsupported => 2,
            Self::InvalidHandle => 3,
            Self::InvalidParameter => 4,
            Self::EngineBusy => 5,
            Self::PhoneOffline => 6,
            Self::Timeout => 7,
            Self::Other(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

// ── Interface version ─────────────────────────────────────────────────────────

/// Version of the remote interface stamped on every call.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    pub const CURRENT: ApiVersion = ApiVersion { major: 1, minor: 4 };
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientId, EventMask, ServiceStatus};

    #[test]
    fn client_id_packs_tag_and_slot() {
        let id = ClientId::new(0xBEEF, 7);
        assert_eq!(id.slot_index(), 7);
        assert_eq!(id.process_tag(), 0xBEEF);
        assert_eq!(ClientId::from_raw(id.raw()), id);
    }

    #[test]
    fn event_mask_set_operations() {
        let mask = EventMask::POSITION_REPORT | EventMask::NMEA_SENTENCE;
        assert!(mask.contains(EventMask::POSITION_REPORT));
        assert!(!mask.contains(EventMask::ENGINE_STATE));
        assert!(mask.intersects(EventMask::NMEA_SENTENCE | EventMask::ENGINE_STATE));
        assert!(EventMask::EMPTY.is_empty());
        assert!(EventMask::ALL.contains(mask));
    }

    #[test]
    fn service_status_code_round_trip() {
        for code in [0, 1, 5, 7, 42, -3] {
            assert_eq!(ServiceStatus::from_code(code).code(), code);
        }
        assert!(ServiceStatus::Success.is_success());
        assert!(!ServiceStatus::EngineBusy.is_success());
    }
}

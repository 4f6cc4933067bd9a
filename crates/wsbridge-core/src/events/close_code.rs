//! WebSocket close codes
//!
//! Named RFC 6455 close codes. Events carry the raw `u16` so that codes
//! outside this list (application codes, 0 for a plain server stop) pass
//! through untouched.

use serde::{Deserialize, Serialize};

/// Standard WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure
    Normal = 1000,
    /// Endpoint is going away (server shutdown, page navigation)
    GoingAway = 1001,
    /// Protocol error
    ProtocolError = 1002,
    /// Received a data type it cannot accept
    Unsupported = 1003,
    /// No status code was present in the close frame
    NoStatus = 1005,
    /// Connection dropped without a close frame
    Abnormal = 1006,
    /// Payload was not consistent with the message type
    InvalidPayload = 1007,
    /// Message violated a policy
    PolicyViolation = 1008,
    /// Message too big to process
    MessageTooBig = 1009,
    /// Client expected an extension the server did not negotiate
    MandatoryExtension = 1010,
    /// Server hit an unexpected condition
    InternalError = 1011,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1002 => Some(Self::ProtocolError),
            1003 => Some(Self::Unsupported),
            1005 => Some(Self::NoStatus),
            1006 => Some(Self::Abnormal),
            1007 => Some(Self::InvalidPayload),
            1008 => Some(Self::PolicyViolation),
            1009 => Some(Self::MessageTooBig),
            1010 => Some(Self::MandatoryExtension),
            1011 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Codes that may only be reported locally, never sent in a close frame
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::NoStatus | Self::Abnormal)
    }

    /// Whether the close was an orderly one
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Normal | Self::GoingAway)
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::GoingAway => "Going away",
            Self::ProtocolError => "Protocol error",
            Self::Unsupported => "Unsupported data",
            Self::NoStatus => "No status received",
            Self::Abnormal => "Abnormal closure",
            Self::InvalidPayload => "Invalid frame payload data",
            Self::PolicyViolation => "Policy violation",
            Self::MessageTooBig => "Message too big",
            Self::MandatoryExtension => "Mandatory extension",
            Self::InternalError => "Internal server error",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::GoingAway => "GoingAway",
            Self::ProtocolError => "ProtocolError",
            Self::Unsupported => "Unsupported",
            Self::NoStatus => "NoStatus",
            Self::Abnormal => "Abnormal",
            Self::InvalidPayload => "InvalidPayload",
            Self::PolicyViolation => "PolicyViolation",
            Self::MessageTooBig => "MessageTooBig",
            Self::MandatoryExtension => "MandatoryExtension",
            Self::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

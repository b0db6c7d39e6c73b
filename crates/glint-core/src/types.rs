//! Connection roles, telemetry values, and endpoint addressing

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, WS_PATH_PREFIX};

/// The role a connection holds for its subscription key.
///
/// Fixed at registration; a connection never migrates between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Consumer endpoint observing/controlling one instrument's stream
    Client,
    /// Physical measurement device represented by a stable identifier
    Instrument,
}

impl Role {
    /// The URL path segment for this role (`/ws/{role}/{id}`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Instrument => "instrument",
        }
    }

    pub fn from_path_segment(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(Role::Client),
            "instrument" => Ok(Role::Instrument),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// A string-serializable scalar carried by a telemetry envelope.
///
/// Instruments report either a number or a raw string reading; the hub
/// rebroadcasts the bare text rendering to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

/// The instrument→hub wire envelope.
///
/// Exactly one recognized field; any other shape is a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryEnvelope {
    pub data: Scalar,
}

impl TelemetryEnvelope {
    pub fn new(data: impl Into<Scalar>) -> Self {
        Self { data: data.into() }
    }
}

/// Parse a hub endpoint path into its role and instrument identifier.
///
/// Accepted shape: `/ws/client/{uuid}` or `/ws/instrument/{uuid}`.
/// A query string, trailing slash, or extra segment is rejected.
pub fn parse_endpoint_path(path: &str) -> Result<(Role, Uuid)> {
    let rest = path
        .strip_prefix(WS_PATH_PREFIX)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(|| Error::InvalidEndpointPath(path.to_string()))?;

    let (role_seg, id_seg) = rest
        .split_once('/')
        .ok_or_else(|| Error::InvalidEndpointPath(path.to_string()))?;

    if id_seg.is_empty() || id_seg.contains('/') || id_seg.contains('?') {
        return Err(Error::InvalidEndpointPath(path.to_string()));
    }

    let role = Role::from_path_segment(role_seg)?;
    let id = Uuid::parse_str(id_seg)
        .map_err(|_| Error::InvalidInstrumentId(id_seg.to_string()))?;

    Ok((role, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_client_path() {
        let id = Uuid::new_v4();
        let (role, parsed) =
            parse_endpoint_path(&format!("/ws/client/{}", id)).unwrap();
        assert_eq!(role, Role::Client);
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_instrument_path() {
        let id = Uuid::new_v4();
        let (role, parsed) =
            parse_endpoint_path(&format!("/ws/instrument/{}", id)).unwrap();
        assert_eq!(role, Role::Instrument);
        assert_eq!(parsed, id);
    }

    #[test]
    fn reject_bad_paths() {
        assert!(parse_endpoint_path("/ws/client/not-a-uuid").is_err());
        assert!(parse_endpoint_path("/ws/operator/00000000-0000-0000-0000-000000000000").is_err());
        assert!(parse_endpoint_path("/client/00000000-0000-0000-0000-000000000000").is_err());
        assert!(parse_endpoint_path("/ws/client").is_err());
        assert!(parse_endpoint_path("/ws/client/").is_err());
    }

    #[test]
    fn scalar_renders_bare_text() {
        assert_eq!(Scalar::Float(42.5).to_string(), "42.5");
        assert_eq!(Scalar::Int(7).to_string(), "7");
        assert_eq!(Scalar::Text("12.80 kg".into()).to_string(), "12.80 kg");
    }
}

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// How the exporter reaches the KNX bus
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConnectionType {
    /// KNXnet/IP tunnelling through a gateway
    Tunnel,
    /// KNXnet/IP routing (multicast)
    Router,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid connection type given: \"{0}\"")]
pub struct InvalidConnectionType(pub String);

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Tunnel => "Tunnel",
            ConnectionType::Router => "Router",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = InvalidConnectionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tunnel" => Ok(ConnectionType::Tunnel),
            "router" => Ok(ConnectionType::Router),
            _ => Err(InvalidConnectionType(s.to_string())),
        }
    }
}

impl Serialize for ConnectionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConnectionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "Type")]
    pub kind: ConnectionType,
    /// Gateway address or multicast group; opaque here
    #[serde(rename = "Endpoint")]
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_decode() {
        for s in ["tunnel", "TUNNEL", "Tunnel", "tUnNeL"] {
            let t: ConnectionType = s.parse().unwrap();
            assert_eq!(t, ConnectionType::Tunnel);
            assert_eq!(t.to_string(), "Tunnel");
        }
        for s in ["router", "ROUTER", "Router"] {
            let t: ConnectionType = s.parse().unwrap();
            assert_eq!(t.to_string(), "Router");
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = "frobnicate".parse::<ConnectionType>().unwrap_err();
        assert_eq!(err, InvalidConnectionType("frobnicate".into()));
        assert_eq!(err.to_string(), "invalid connection type given: \"frobnicate\"");
        assert!("".parse::<ConnectionType>().is_err());
        assert!(" tunnel".parse::<ConnectionType>().is_err());
    }

    #[test]
    fn test_connection_serde() {
        let c: Connection =
            serde_json::from_str(r#"{"Type":"ROUTER","Endpoint":"224.0.23.12:3671"}"#).unwrap();
        assert_eq!(c.kind, ConnectionType::Router);
        assert_eq!(
            serde_json::to_string(&c).unwrap(),
            r#"{"Type":"Router","Endpoint":"224.0.23.12:3671"}"#
        );
    }
}

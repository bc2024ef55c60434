use crate::{AddressParseError, DurationParseError, GroupAddress, InvalidConnectionType};
use thiserror::Error;

pub type Result<T, E = ConfigError> = core::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed configuration document: {0}")]
    Structural(String),
    #[error("Connection.Type: {source}")]
    ConnectionType { source: InvalidConnectionType },
    #[error("AddressConfigs[\"{address}\"].MaxAge: {source}")]
    MaxAge {
        address: String,
        source: DurationParseError,
    },
    #[error("AddressConfigs key: {source}")]
    Address {
        key: String,
        source: AddressParseError,
    },
    #[error("AddressConfigs keys \"{first}\" and \"{second}\" both name group address {address}")]
    DuplicateAddress {
        address: GroupAddress,
        first: String,
        second: String,
    },
    #[error("encoding configuration: {0}")]
    Encode(String),
    #[error("AddressConfigs[\"{address}\"]: {reason}")]
    Invalid {
        address: GroupAddress,
        reason: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Structural(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Structural(e.to_string())
    }
}

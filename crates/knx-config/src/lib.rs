//! knx-config: typed configuration for exporting KNX group addresses as metrics
//!
//! The document names the bus connection, a metric name prefix, and one entry
//! per group address. Decoding is strict and stops at the first bad field;
//! encoding drops fields that hold their default so regenerated documents stay
//! minimal. No I/O happens here: callers hand in bytes and get bytes back.

mod address;
pub use address::{AddressParseError, GroupAddress};

mod connection;
pub use connection::{Connection, ConnectionType, InvalidConnectionType};

mod duration;
pub use duration::{Duration, DurationParseError};

mod error;
pub use error::{ConfigError, Result};

mod types;
pub use types::{Config, GroupAddressConfig};

mod raw;

mod codec;
pub use codec::{
    decode, decode_as, decode_yaml, encode, encode_as, encode_pretty, encode_yaml, DocumentFormat,
};

mod shared;
pub use shared::SharedConfig;

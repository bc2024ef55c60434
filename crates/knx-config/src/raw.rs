//! Document shape as written on disk.
//!
//! Scalars stay as text and map entries stay in document order so that the
//! typed conversion can report which key or field failed, and so that
//! repeated address keys are seen instead of silently overwritten.

use crate::{
    Config, ConfigError, Connection, Duration, DurationParseError, GroupAddress,
    GroupAddressConfig,
};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RawConfig {
    #[serde(rename = "Connection", default)]
    connection: Option<RawConnection>,
    #[serde(rename = "MetricsPrefix")]
    metrics_prefix: String,
    #[serde(rename = "AddressConfigs")]
    address_configs: Entries<RawAddressConfig>,
}

#[derive(Debug, serde::Deserialize)]
struct RawConnection {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Endpoint")]
    endpoint: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawAddressConfig {
    name: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(rename = "DPT")]
    dpt: String,
    metric_type: String,
    export: bool,
    #[serde(default)]
    read_active: Option<bool>,
    #[serde(default)]
    max_age: Option<String>,
}

/// Map entries in document order, duplicates included
#[derive(Debug)]
struct Entries<T>(Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by group address")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    out.push((key, value));
                }
                Ok(Entries(out))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl TryFrom<RawAddressConfig> for GroupAddressConfig {
    type Error = DurationParseError;

    fn try_from(raw: RawAddressConfig) -> Result<Self, Self::Error> {
        let max_age = match raw.max_age {
            Some(text) => Duration::parse(&text)?,
            None => Duration::ZERO,
        };
        Ok(GroupAddressConfig {
            name: raw.name,
            comment: raw.comment.unwrap_or_default(),
            dpt: raw.dpt,
            metric_type: raw.metric_type,
            export: raw.export,
            read_active: raw.read_active.unwrap_or(false),
            max_age,
        })
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let connection = match raw.connection {
            Some(c) => Some(Connection {
                kind: c
                    .kind
                    .parse()
                    .map_err(|source| ConfigError::ConnectionType { source })?,
                endpoint: c.endpoint,
            }),
            None => None,
        };

        let mut address_configs = BTreeMap::new();
        let mut keys: HashMap<GroupAddress, String> = HashMap::new();
        for (key, entry) in raw.address_configs.0 {
            let address: GroupAddress = match key.parse() {
                Ok(address) => address,
                Err(source) => return Err(ConfigError::Address { key, source }),
            };
            if let Some(first) = keys.get(&address) {
                return Err(ConfigError::DuplicateAddress {
                    address,
                    first: first.clone(),
                    second: key,
                });
            }
            let entry = match GroupAddressConfig::try_from(entry) {
                Ok(entry) => entry,
                Err(source) => {
                    return Err(ConfigError::MaxAge {
                        address: key,
                        source,
                    })
                }
            };
            keys.insert(address, key);
            address_configs.insert(address, entry);
        }

        Ok(Config {
            connection,
            metrics_prefix: raw.metrics_prefix,
            address_configs,
        })
    }
}

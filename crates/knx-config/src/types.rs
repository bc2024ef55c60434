use crate::raw::{RawAddressConfig, RawConfig};
use crate::{ConfigError, Connection, Duration, GroupAddress, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of the exporter configuration: which group addresses become which metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    #[serde(rename = "Connection", skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
    /// Prepended to every exported metric name
    #[serde(rename = "MetricsPrefix")]
    pub metrics_prefix: String,
    #[serde(rename = "AddressConfigs")]
    pub address_configs: BTreeMap<GroupAddress, GroupAddressConfig>,
}

/// Maps one KNX group address to one exported metric
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAddressConfig", rename_all = "PascalCase")]
pub struct GroupAddressConfig {
    /// Metric name without the prefix
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Data point type, e.g. `9.001`; interpreted by the bus decoder
    #[serde(rename = "DPT")]
    pub dpt: String,
    /// `gauge` or `counter`
    pub metric_type: String,
    pub export: bool,
    /// Poll the address with `GroupValueRead` instead of only listening
    #[serde(skip_serializing_if = "is_false")]
    pub read_active: bool,
    /// Staleness threshold that triggers an active read
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub max_age: Duration,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Config {
    /// Full exported name: prefix followed by the entry's name.
    pub fn metric_name(&self, entry: &GroupAddressConfig) -> String {
        format!("{}{}", self.metrics_prefix, entry.name)
    }

    pub fn metric_name_for(&self, address: GroupAddress) -> Option<String> {
        self.address_configs
            .get(&address)
            .map(|entry| self.metric_name(entry))
    }

    pub fn exported(&self) -> impl Iterator<Item = (GroupAddress, &GroupAddressConfig)> + '_ {
        self.address_configs
            .iter()
            .filter(|(_, entry)| entry.export)
            .map(|(address, entry)| (*address, entry))
    }

    pub fn active_reads(&self) -> impl Iterator<Item = (GroupAddress, &GroupAddressConfig)> + '_ {
        self.address_configs
            .iter()
            .filter(|(_, entry)| entry.read_active)
            .map(|(address, entry)| (*address, entry))
    }

    /// Checks downstream consumers rely on; decoding alone does not enforce them.
    ///
    /// Stops at the first offending entry.
    pub fn validate(&self) -> Result<()> {
        for (address, entry) in &self.address_configs {
            let invalid = |reason: String| ConfigError::Invalid {
                address: *address,
                reason,
            };
            if entry.name.is_empty() {
                return Err(invalid("Name must not be empty".into()));
            }
            let full = self.metric_name(entry);
            if !is_valid_metric_name(&full) {
                return Err(invalid(format!("\"{full}\" is not a valid metric name")));
            }
            if entry.max_age.is_negative() {
                return Err(invalid(format!(
                    "MaxAge must not be negative, got {}",
                    entry.max_age
                )));
            }
        }
        Ok(())
    }
}

// [a-zA-Z_:][a-zA-Z0-9_:]*
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

use crate::raw::RawConfig;
use crate::{Config, ConfigError, Result};
use tracing::debug;

/// Text format of a configuration document
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Decode a JSON configuration document.
///
/// The first failing field aborts the decode; nothing is defaulted on error.
pub fn decode(bytes: &[u8]) -> Result<Config> {
    let raw: RawConfig = serde_json::from_slice(bytes)?;
    finish_decode(raw, DocumentFormat::Json)
}

pub fn decode_yaml(bytes: &[u8]) -> Result<Config> {
    let raw: RawConfig = serde_yaml::from_slice(bytes)?;
    finish_decode(raw, DocumentFormat::Yaml)
}

pub fn decode_as(format: DocumentFormat, bytes: &[u8]) -> Result<Config> {
    match format {
        DocumentFormat::Json => decode(bytes),
        DocumentFormat::Yaml => decode_yaml(bytes),
    }
}

fn finish_decode(raw: RawConfig, format: DocumentFormat) -> Result<Config> {
    let config = Config::try_from(raw)?;
    debug!(
        ?format,
        addresses = config.address_configs.len(),
        connection = config.connection.is_some(),
        "decoded configuration"
    );
    Ok(config)
}

/// Encode as compact JSON, omitting fields that hold their default.
///
/// Fails only if the serializer itself does.
pub fn encode(config: &Config) -> Result<Vec<u8>> {
    let out = serde_json::to_vec(config).map_err(|e| ConfigError::Encode(e.to_string()))?;
    debug!(bytes = out.len(), "encoded configuration");
    Ok(out)
}

pub fn encode_pretty(config: &Config) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(config).map_err(|e| ConfigError::Encode(e.to_string()))
}

pub fn encode_yaml(config: &Config) -> Result<Vec<u8>> {
    serde_yaml::to_string(config)
        .map(String::into_bytes)
        .map_err(|e| ConfigError::Encode(e.to_string()))
}

pub fn encode_as(format: DocumentFormat, config: &Config) -> Result<Vec<u8>> {
    match format {
        DocumentFormat::Json => encode_pretty(config),
        DocumentFormat::Yaml => encode_yaml(config),
    }
}

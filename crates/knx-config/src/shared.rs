use crate::{codec, Config, DocumentFormat, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Live configuration handed to the bus client and exporter.
///
/// Readers hold an `Arc<Config>` snapshot that never changes underneath them;
/// a reload swaps in a whole new value.
#[derive(Debug)]
pub struct SharedConfig {
    inner: RwLock<Arc<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: RwLock::new(Arc::new(config)),
        }
    }

    pub fn current(&self) -> Arc<Config> {
        self.inner.read().clone()
    }

    /// Install `config` and return the value it replaced.
    pub fn replace(&self, config: Config) -> Arc<Config> {
        let addresses = config.address_configs.len();
        let previous = std::mem::replace(&mut *self.inner.write(), Arc::new(config));
        info!(addresses, "configuration replaced");
        previous
    }

    /// Decode `bytes` and install the result; on error the current value stays.
    pub fn reload(&self, format: DocumentFormat, bytes: &[u8]) -> Result<Arc<Config>> {
        let config = codec::decode_as(format, bytes)?;
        self.replace(config);
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = br#"{"MetricsPrefix":"knx_","AddressConfigs":{"1/2/3":{"Name":"temp","DPT":"9.001","MetricType":"gauge","Export":true}}}"#;

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedConfig::new(Config::default());
        let before = shared.current();
        let after = shared.reload(DocumentFormat::Json, DOC).unwrap();
        assert!(before.address_configs.is_empty());
        assert_eq!(after.address_configs.len(), 1);
        assert_eq!(shared.current().metrics_prefix, "knx_");
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let shared = SharedConfig::new(codec::decode(DOC).unwrap());
        assert!(shared.reload(DocumentFormat::Json, b"{}").is_err());
        assert_eq!(shared.current().address_configs.len(), 1);
    }

    #[test]
    fn test_replace_returns_previous() {
        let shared = SharedConfig::new(codec::decode(DOC).unwrap());
        let previous = shared.replace(Config::default());
        assert_eq!(previous.metrics_prefix, "knx_");
        assert!(shared.current().address_configs.is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let shared = Arc::new(SharedConfig::new(codec::decode(DOC).unwrap()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.current().address_configs.len())
            })
            .collect();
        shared.replace(Config::default());
        for h in handles {
            let n = h.join().unwrap();
            assert!(n == 0 || n == 1);
        }
    }
}

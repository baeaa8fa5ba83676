use std::{fs, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// backend endpoint config
    pub endpoint: EndpointConfig,
    /// validation gateway config
    pub gateway: GatewayConfig,
    /// notification relay config
    pub notify: NotifyConfig,
    /// number of async worker threads, range [1, 32768), defaults to 4
    pub async_worker_thread_number: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// base URL of the hosting page; REST paths and the socket path are
    /// derived from it
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// fixed delay between reconnect attempts, in milliseconds
    pub reconnect_delay_ms: u64,
    /// capacity of the outbound send queue
    pub send_queue_size: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotifyConfig {
    /// how long a toast stays in the queue, in milliseconds
    pub toast_ttl_ms: u64,
    /// capacity of the toast broadcast queue
    pub queue_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            gateway: GatewayConfig::default(),
            notify: NotifyConfig::default(),
            async_worker_thread_number: 4,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2000,
            send_queue_size: 1024,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            toast_ttl_ms: 6000,
            queue_size: 256,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Self {
        let data = fs::read_to_string(path.as_ref()).expect(&format!("failed to load config file {:?}", path.as_ref()));

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Self {
        let config = toml::from_str::<Config>(toml_str).expect("failed to parse the toml str");
        config
    }
}

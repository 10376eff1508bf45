use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub devices: DevicesConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Control API port; bound on all interfaces.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Tuning for the dispatch loop and the outbound call executor.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Upstream stats endpoint every view request is issued against.
    pub endpoint: String,
    /// Upper bound on concurrently dispatched calls per batch.
    pub concurrency: usize,
    /// Per-call timeout; an expired call counts as a timeout failure.
    pub request_timeout_ms: u64,
    /// Pause between settled batches.
    pub batch_pause_ms: u64,
    /// Target view count used when a start request carries none.
    pub default_target: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api16-va.tiktokv.com/aweme/v1/aweme/stats/".to_string(),
            concurrency: 200,
            request_timeout_ms: 3000,
            batch_pause_ms: 10,
            default_target: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DevicesConfig {
    /// Newline-delimited `did:iid:cdid:openudid` tuples, re-read at each run start.
    pub path: String,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            path: "devices.txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9100,
        }
    }
}

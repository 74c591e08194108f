//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log and trace output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,

    /// Subsystem identifier (01-17)
    pub subsystem_id: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to write events to the console at all
    pub console_output: bool,

    /// Whether to emit JSON formatted events
    pub json_logs: bool,

    /// Network identifier (testnet, mainnet, devnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "quantum-chain".to_string(),
            subsystem_id: "00".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "testnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Field | Default |
    /// |----------|-------|---------|
    /// | `OTEL_SERVICE_NAME` | `service_name` | `quantum-chain` |
    /// | `QC_SUBSYSTEM_ID` | `subsystem_id` | `00` |
    /// | `QC_LOG_LEVEL`, then `RUST_LOG` | `log_level` | `info` |
    /// | `QC_CONSOLE_OUTPUT` | `console_output` | `true` |
    /// | `QC_JSON_LOGS` | `json_logs` | `true` inside a container |
    /// | `QC_NETWORK` | `network` | `testnet` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `var`.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let in_container =
            var("KUBERNETES_SERVICE_HOST").is_some() || var("DOCKER_CONTAINER").is_some();

        Self {
            service_name: var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            subsystem_id: var("QC_SUBSYSTEM_ID").unwrap_or(defaults.subsystem_id),
            log_level: var("QC_LOG_LEVEL")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: var("QC_CONSOLE_OUTPUT")
                .map_or(defaults.console_output, |v| parse_flag(&v, true)),
            json_logs: var("QC_JSON_LOGS").map_or(in_container, |v| parse_flag(&v, false)),
            network: var("QC_NETWORK").unwrap_or(defaults.network),
        }
    }

    /// Create configuration for a specific subsystem.
    pub fn for_subsystem(subsystem_id: &str, subsystem_name: &str) -> Self {
        let mut config = Self::from_env();
        config.subsystem_id = subsystem_id.to_string();
        config.service_name = format!("qc-{}-{}", subsystem_id, subsystem_name);
        config
    }

    /// Get the full service name including subsystem.
    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == "00" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}

/// Parse a boolean environment flag, falling back to `default` for junk.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

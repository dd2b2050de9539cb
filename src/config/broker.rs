//! Broker listener options
//!
//! The listeners themselves belong to the broker engine; these options are
//! checked here so a bad address fails at startup instead of inside the engine.

use serde::Deserialize;

/// Listener and buffer options handed to the broker engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrokerOptions {
    /// Accept MQTT over websocket
    pub websocket_enabled: bool,
    /// Websocket listener address (host:port)
    pub websocket_bind_address: String,
    /// Accept MQTT over plain TCP
    pub tcp_enabled: bool,
    /// TCP listener address (host:port)
    pub tcp_bind_address: String,
    /// Engine client buffer size in bytes (0 = engine default)
    pub buffer_size: usize,
    /// Engine client buffer block size in bytes (0 = engine default)
    pub buffer_block_size: usize,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            websocket_enabled: true,
            websocket_bind_address: "localhost:1888".to_string(),
            tcp_enabled: false,
            tcp_bind_address: "localhost:1883".to_string(),
            buffer_size: 0,
            buffer_block_size: 0,
        }
    }
}

impl BrokerOptions {
    /// Check that at least one listener is enabled and every enabled
    /// listener has a usable address
    pub fn validate(&self) -> Result<(), String> {
        if !self.websocket_enabled && !self.tcp_enabled {
            return Err("at least websocket or TCP must be enabled".to_string());
        }

        if self.websocket_enabled {
            split_host_port(&self.websocket_bind_address).map_err(|e| {
                format!(
                    "parsing websocket bind address ({}) failed: {}",
                    self.websocket_bind_address, e
                )
            })?;
        }

        if self.tcp_enabled {
            split_host_port(&self.tcp_bind_address).map_err(|e| {
                format!(
                    "parsing TCP bind address ({}) failed: {}",
                    self.tcp_bind_address, e
                )
            })?;
        }

        Ok(())
    }
}

/// Split "host:port", "[v6]:port" or ":port" into host and port
///
/// The host may be a name, so this does not resolve or parse it as an IP.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), &'static str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or("missing ']' in address")?;
        let port = after.strip_prefix(':').ok_or("missing port in address")?;
        if port.contains(':') {
            return Err("too many colons in address");
        }
        return Ok((host, port));
    }

    let (host, port) = addr.rsplit_once(':').ok_or("missing port in address")?;
    if host.contains(':') {
        return Err("too many colons in address");
    }
    if host.contains('[') || host.contains(']') || port.contains(']') {
        return Err("unexpected bracket in address");
    }
    Ok((host, port))
}

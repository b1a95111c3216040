use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "DISCONNECTED"),
            ConnectionStatus::Connecting => write!(f, "CONNECTING"),
            ConnectionStatus::Connected => write!(f, "CONNECTED"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Region {
    Americas,
    Europe,
    Asia,
    Africa,
    Oceania,
}

impl Region {
    pub fn all() -> &'static [Region] {
        &[
            Region::Americas,
            Region::Europe,
            Region::Asia,
            Region::Africa,
            Region::Oceania,
        ]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Americas => "Americas",
            Region::Europe => "Europe",
            Region::Asia => "Asia",
            Region::Africa => "Africa",
            Region::Oceania => "Oceania",
        };
        f.write_str(name)
    }
}

/// Static catalog entry. The `ip` is a display string only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub country: String,
    pub flag: String,
    pub ip: String,
    pub ping: u32,
    pub load: u8,
    pub region: Region,
}

impl Server {
    pub fn summary(&self) -> ServerSummary {
        ServerSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            ping: self.ping,
            load: self.load,
        }
    }
}

/// Projection of a [`Server`] handed to the recommendation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSummary {
    pub id: String,
    pub name: String,
    pub ping: u32,
    pub load: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TelemetrySample {
    /// `HH:MM:SS` wall-clock time, empty for flatline samples.
    pub timestamp: String,
    pub downstream: u32,
    pub upstream: u32,
}

impl TelemetrySample {
    pub fn flatline() -> Self {
        Self::default()
    }

    pub fn is_flatline(&self) -> bool {
        self.timestamp.is_empty() && self.downstream == 0 && self.upstream == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub server_id: String,
    pub reason: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Default)]
pub enum Protocol {
    #[default]
    WireGuard,
    OpenVpnTcp,
    OpenVpnUdp,
    Shadowsocks,
}

impl Protocol {
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::WireGuard => "WireGuard",
            Protocol::OpenVpnTcp => "OpenVPN TCP",
            Protocol::OpenVpnUdp => "OpenVPN UDP",
            Protocol::Shadowsocks => "Shadowsocks",
        }
    }

    pub fn all() -> &'static [Protocol] {
        &[
            Protocol::WireGuard,
            Protocol::OpenVpnTcp,
            Protocol::OpenVpnUdp,
            Protocol::Shadowsocks,
        ]
    }

    /// Accepts either the display name or a compact form such as `openvpn-udp`.
    pub fn parse(input: &str) -> Option<Protocol> {
        let key: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "wireguard" | "wg" => Some(Protocol::WireGuard),
            "openvpntcp" => Some(Protocol::OpenVpnTcp),
            "openvpnudp" => Some(Protocol::OpenVpnUdp),
            "shadowsocks" | "ss" => Some(Protocol::Shadowsocks),
            _ => None,
        }
    }
}

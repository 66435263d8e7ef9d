use std::net::Ipv4Addr;
use std::net::SocketAddrV4;
use std::time::Duration;

/// UDP port every device listens on and every reply is sent to.
pub const DISCOVERY_PORT: u16 = 30718;

/// Local port used by the vendor's own client when sending commands.
pub const COMMAND_PORT: u16 = DISCOVERY_PORT + 1;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DiscoveryConfig {
    pub discovery_port: u16,
    pub command_port: u16,
    pub broadcast_ip: Ipv4Addr,

    /// How long replies are collected after each probe.
    pub collection_window: Duration,

    /// Pause between the end of one round and the next probe.
    pub interval: Duration,
}

impl DiscoveryConfig {
    pub fn broadcast_address(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast_ip, self.discovery_port)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            discovery_port: DISCOVERY_PORT,
            command_port: COMMAND_PORT,
            broadcast_ip: Ipv4Addr::BROADCAST,
            collection_window: Duration::from_secs(2),
            interval: Duration::from_secs(5),
        }
    }
}

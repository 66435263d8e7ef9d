//! Discovery and provisioning of Barix devices on the local broadcast domain.

mod config;
mod discovery;
mod network;
mod packet;
mod provision;
mod registry;

pub use config::DiscoveryConfig;
pub use config::COMMAND_PORT;
pub use config::DISCOVERY_PORT;
pub use discovery::Discovery;
pub use discovery::DiscoveryError;
pub use network::udp_receiver::TokioUdpReceiver;
pub use network::udp_receiver::UdpReceiver;
pub use network::udp_sender::TokioUdpSender;
pub use network::udp_sender::UdpSender;
pub use packet::decode_discovery_reply;
pub use packet::encode_discovery_probe;
pub use packet::encode_set_ip_command;
pub use packet::CodecError;
pub use packet::MacAddress;
pub use packet::VENDOR_PREFIX;
pub use provision::ProvisionError;
pub use provision::Provisioner;
pub use registry::Device;
pub use registry::Registry;
pub use registry::RoundSummary;
pub use registry::SharedRegistry;

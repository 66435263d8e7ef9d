pub mod udp_receiver;
pub mod udp_sender;

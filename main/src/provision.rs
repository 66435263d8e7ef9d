use crate::config::DiscoveryConfig;
use crate::network::udp_sender::TokioUdpSender;
use crate::network::udp_sender::UdpSender;
use crate::packet::CodecError;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;
use std::sync::Arc;
use thiserror::Error;

/// Sends set-IP commands.
///
/// Devices never acknowledge a command, so a successful send only means the
/// frame left this host. The next discovery round shows whether it was applied.
pub struct Provisioner<S> {
    config: DiscoveryConfig,
    sender: S,
}

impl Provisioner<TokioUdpSender> {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self::with_sender(config, TokioUdpSender)
    }
}

impl<S: UdpSender> Provisioner<S> {
    pub fn with_sender(config: DiscoveryConfig, sender: S) -> Self {
        Self { config, sender }
    }

    /// Returns the parsed address so that callers can update their registry.
    pub async fn set_device_ip(
        &self,
        mac: &[u8],
        new_ip: &str,
    ) -> Result<Ipv4Addr, ProvisionError> {
        let ip = parse_ipv4(new_ip)?;
        let frame: Arc<[u8]> = crate::packet::encode_set_ip_command(mac, ip)?.into();
        let destination = self.config.broadcast_address();
        log::info!("Sending set-IP command for {} to {}", ip, destination);
        self.sender
            .send_broadcast_from(self.config.command_port, destination, frame)
            .await?;
        Ok(ip)
    }
}

fn parse_ipv4(input: &str) -> Result<Ipv4Addr, ProvisionError> {
    let input = input.trim();
    match input.parse() {
        Ok(IpAddr::V4(ip)) => Ok(ip),
        Ok(IpAddr::V6(ip)) => Err(ProvisionError::NotIpv4(ip)),
        Err(_) => Err(ProvisionError::InvalidAddress(input.into())),
    }
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid IP address `{0}`")]
    InvalidAddress(String),

    #[error("IP must be IPv4, got {0}")]
    NotIpv4(Ipv6Addr),

    #[error("Invalid command input")]
    InvalidInput(#[from] CodecError),

    #[error("Failed to send the command")]
    Network(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::udp_sender::MockUdpSender;
    use futures_util::FutureExt;
    use mockall::predicate::eq;
    use std::net::SocketAddrV4;

    const MAC: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

    fn silent_sender() -> MockUdpSender {
        let mut sender = MockUdpSender::new();
        sender.expect_send_broadcast_from().never();
        sender.expect_send_broadcast().never();
        sender
    }

    #[tokio::test]
    async fn set_device_ip() {
        crate::test::init();

        let expected_frame: Arc<[u8]> = vec![
            0x81, 0x88, 0x53, 0x81, 0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x0A, 0x00, 0x00,
            0x05,
        ]
        .into();
        let mut sender = MockUdpSender::new();
        sender
            .expect_send_broadcast_from()
            .with(
                eq(30719_u16),
                eq(SocketAddrV4::new(Ipv4Addr::BROADCAST, 30718)),
                eq(expected_frame),
            )
            .times(1)
            .returning(|_, _, _| async { Ok(()) }.boxed());
        let provisioner = Provisioner::with_sender(Default::default(), sender);

        // When
        let ip = provisioner.set_device_ip(&MAC, " 10.0.0.5\n").await.unwrap();

        // Then
        assert_eq!(ip, Ipv4Addr::new(10, 0, 0, 5));
    }

    #[tokio::test]
    async fn invalid_address() {
        crate::test::init();

        let provisioner = Provisioner::with_sender(Default::default(), silent_sender());

        // When
        let e = provisioner.set_device_ip(&MAC, "not-an-ip").await.unwrap_err();

        // Then
        if let ProvisionError::InvalidAddress(input) = e {
            assert_eq!(input, "not-an-ip");
        } else {
            panic!("Expecting `InvalidAddress`")
        }
    }

    #[tokio::test]
    async fn ipv6_address() {
        crate::test::init();

        let provisioner = Provisioner::with_sender(Default::default(), silent_sender());

        let e = provisioner.set_device_ip(&MAC, "fe80::1").await.unwrap_err();

        assert!(matches!(e, ProvisionError::NotIpv4(_)));
    }

    #[tokio::test]
    async fn mac_length_mismatch() {
        crate::test::init();

        let provisioner = Provisioner::with_sender(Default::default(), silent_sender());

        let e = provisioner
            .set_device_ip(&MAC[..5], "10.0.0.5")
            .await
            .unwrap_err();

        assert!(matches!(
            e,
            ProvisionError::InvalidInput(CodecError::MacLength(5))
        ));
    }

    #[tokio::test]
    async fn network_failure() {
        crate::test::init();

        let mut sender = MockUdpSender::new();
        sender.expect_send_broadcast_from().return_once(|_, _, _| {
            async { Err(std::io::ErrorKind::AddrNotAvailable.into()) }.boxed()
        });
        let provisioner = Provisioner::with_sender(Default::default(), sender);

        let e = provisioner.set_device_ip(&MAC, "10.0.0.5").await.unwrap_err();

        assert!(matches!(e, ProvisionError::Network(_)));
    }
}

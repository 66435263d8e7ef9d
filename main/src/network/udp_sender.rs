use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use mockall::automock;
use std::net::Ipv4Addr;
use std::net::SocketAddrV4;
use std::sync::Arc;
use tokio::net::UdpSocket;

#[automock]
pub trait UdpSender {
    /// Sends `data` from an ephemeral port.
    fn send_broadcast(
        &self,
        destination: SocketAddrV4,
        data: Arc<[u8]>,
    ) -> BoxFuture<'static, std::io::Result<()>>;

    /// Sends `data` from `preferred_local_port`, or from an ephemeral port if it is taken.
    fn send_broadcast_from(
        &self,
        preferred_local_port: u16,
        destination: SocketAddrV4,
        data: Arc<[u8]>,
    ) -> BoxFuture<'static, std::io::Result<()>>;
}

pub struct TokioUdpSender;

impl TokioUdpSender {
    async fn send(
        socket: UdpSocket,
        destination: SocketAddrV4,
        data: Arc<[u8]>,
    ) -> std::io::Result<()> {
        socket.set_broadcast(true)?;
        log::debug!(
            "Sending {} bytes from {:?} to {}",
            data.len(),
            socket.local_addr()?,
            destination
        );
        socket.send_to(&data, destination).await?;
        Ok(())
    }

    async fn bind_preferred(preferred_local_port: u16) -> std::io::Result<UdpSocket> {
        let preferred_address = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, preferred_local_port);
        match UdpSocket::bind(preferred_address).await {
            Ok(socket) => Ok(socket),
            Err(e) => {
                log::debug!(
                    "Cannot bind {}, falling back to an ephemeral port: {}",
                    preferred_address,
                    e
                );
                UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await
            }
        }
    }
}

impl UdpSender for TokioUdpSender {
    fn send_broadcast(
        &self,
        destination: SocketAddrV4,
        data: Arc<[u8]>,
    ) -> BoxFuture<'static, std::io::Result<()>> {
        async move {
            let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
            Self::send(socket, destination, data).await
        }
        .boxed()
    }

    fn send_broadcast_from(
        &self,
        preferred_local_port: u16,
        destination: SocketAddrV4,
        data: Arc<[u8]>,
    ) -> BoxFuture<'static, std::io::Result<()>> {
        async move {
            let socket = Self::bind_preferred(preferred_local_port).await?;
            Self::send(socket, destination, data).await
        }
        .boxed()
    }
}

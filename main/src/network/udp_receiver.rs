use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use futures_util::StreamExt;
use mockall::automock;
use std::net::Ipv4Addr;
use std::net::SocketAddrV4;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tokio_util::codec::BytesCodec;
use tokio_util::udp::UdpFramed;

#[automock]
pub trait UdpReceiver {
    /// Receives datagrams on `port` until `window` elapses.
    ///
    /// Payloads are returned in arrival order regardless of their sender.
    /// Only a failure to bind is reported as an error.
    fn collect(
        &self,
        port: u16,
        window: Duration,
    ) -> BoxFuture<'static, std::io::Result<Vec<Vec<u8>>>>;
}

pub struct TokioUdpReceiver;

impl TokioUdpReceiver {
    async fn collect(port: u16, window: Duration) -> std::io::Result<Vec<Vec<u8>>> {
        let bind_address = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
        log::info!("Binding `UdpReceiver` socket at {}", bind_address);
        let socket = UdpSocket::bind(bind_address).await?;
        let mut frames = UdpFramed::new(socket, BytesCodec::new());

        let deadline = Instant::now() + window;
        let mut payloads = Vec::default();
        loop {
            match tokio::time::timeout_at(deadline, frames.next()).await {
                Err(_) | Ok(None) => break,
                Ok(Some(Ok((payload, remote_address)))) => {
                    log::debug!("Received {} bytes from {}", payload.len(), remote_address);
                    payloads.push(payload.to_vec());
                }
                Ok(Some(Err(e))) => {
                    log::warn!("Stopped receiving on {}: {}", bind_address, e);
                    break;
                }
            }
        }
        Ok(payloads)
    }
}

impl UdpReceiver for TokioUdpReceiver {
    fn collect(
        &self,
        port: u16,
        window: Duration,
    ) -> BoxFuture<'static, std::io::Result<Vec<Vec<u8>>>> {
        Self::collect(port, window).boxed()
    }
}

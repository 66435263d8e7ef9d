use crate::config::DiscoveryConfig;
use crate::network::udp_receiver::TokioUdpReceiver;
use crate::network::udp_receiver::UdpReceiver;
use crate::network::udp_sender::TokioUdpSender;
use crate::network::udp_sender::UdpSender;
use crate::packet;
use crate::registry::RoundSummary;
use crate::registry::SharedRegistry;
use futures_channel::mpsc::UnboundedSender;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub struct Discovery<S, R> {
    config: DiscoveryConfig,
    registry: SharedRegistry,
    sender: S,
    receiver: R,
}

impl Discovery<TokioUdpSender, TokioUdpReceiver> {
    pub fn new(config: DiscoveryConfig, registry: SharedRegistry) -> Self {
        Self::with_transports(config, registry, TokioUdpSender, TokioUdpReceiver)
    }
}

impl<S, R> Discovery<S, R>
where
    S: UdpSender,
    R: UdpReceiver,
{
    pub fn with_transports(
        config: DiscoveryConfig,
        registry: SharedRegistry,
        sender: S,
        receiver: R,
    ) -> Self {
        Self {
            config,
            registry,
            sender,
            receiver,
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Broadcasts one probe, collects the replies and merges them into the registry.
    pub async fn run_round(&self) -> Result<RoundSummary, DiscoveryError> {
        let probe: Arc<[u8]> = packet::encode_discovery_probe().to_vec().into();
        let destination = self.config.broadcast_address();
        log::debug!("Sending discovery probe to {}", destination);

        // The receiver is polled first so that it is bound before the probe leaves.
        let (replies, sent) = futures_util::future::join(
            self.receiver
                .collect(self.config.discovery_port, self.config.collection_window),
            self.sender.send_broadcast(destination, probe),
        )
        .await;
        sent.map_err(DiscoveryError::Probe)?;
        let replies = replies.map_err(DiscoveryError::Collect)?;

        let decoded: Vec<_> = replies
            .iter()
            .filter_map(|reply| packet::decode_discovery_reply(reply))
            .collect();
        let summary = self.registry.merge_round(replies.len(), decoded);
        log::debug!(
            "Round finished: {} replies, {} accepted, {} new devices",
            summary.received,
            summary.accepted,
            summary.new_devices
        );
        Ok(summary)
    }

    /// Runs discovery rounds until `cancellation` fires.
    ///
    /// A failed round is logged and retried after the usual interval.
    pub async fn run(
        &self,
        cancellation: CancellationToken,
        rounds: UnboundedSender<RoundSummary>,
    ) {
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                result = self.run_round() => match result {
                    Ok(summary) => {
                        if rounds.unbounded_send(summary).is_err() {
                            log::debug!("Nobody is listening to discovery rounds");
                        }
                    }
                    Err(e) => log::warn!("Discovery round failed: {}", e),
                },
            }
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
        log::info!("Discovery stopped");
    }
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to broadcast the discovery probe")]
    Probe(#[source] std::io::Error),

    #[error("Failed to collect discovery replies")]
    Collect(#[source] std::io::Error),
}

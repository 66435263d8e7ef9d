use barix::Discovery;
use barix::DiscoveryConfig;
use barix::MacAddress;
use barix::Provisioner;
use barix::SharedRegistry;

pub async fn scan(config: DiscoveryConfig, rounds: usize) -> anyhow::Result<()> {
    let interval = config.interval;
    let discovery = Discovery::new(config, SharedRegistry::default());
    for round in 1..=rounds {
        if round > 1 {
            tokio::time::sleep(interval).await;
        }
        if let Err(e) = discovery.run_round().await {
            log::warn!("Discovery round {} failed: {}", round, e);
        }
    }
    println!("{}", crate::table::render(&discovery.registry().list()));
    Ok(())
}

pub async fn set_ip(config: DiscoveryConfig, mac: MacAddress, ip: &str) -> anyhow::Result<()> {
    let ip = Provisioner::new(config)
        .set_device_ip(&mac.octets(), ip)
        .await?;
    println!("Sent SET IP command: {} -> {}", mac, ip);
    Ok(())
}

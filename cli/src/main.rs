mod action;
mod process;
mod scan;
mod table;
mod watch;

use barix::DiscoveryConfig;
use barix::MacAddress;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::net::Ipv4Addr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.network.into();
    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => crate::watch::watch(config).await?,
        Command::Scan { rounds } => crate::scan::scan(config, rounds).await?,
        Command::SetIp { mac, ip } => crate::scan::set_ip(config, mac, &ip).await?,
    };
    Ok(())
}

/// Discovers Barix devices on the local network and reassigns their IP addresses.
#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    network: NetworkArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Keep discovering in the background and manage devices interactively (default).
    Watch,

    /// Run discovery rounds and print the devices found.
    Scan {
        #[arg(long, default_value_t = 1)]
        rounds: usize,
    },

    /// Send a set-IP command to a device without discovering it first.
    SetIp { mac: MacAddress, ip: String },
}

#[derive(Args)]
struct NetworkArgs {
    /// UDP port devices listen and reply on.
    #[arg(long, global = true, default_value_t = barix::DISCOVERY_PORT)]
    port: u16,

    /// Local port preferred when sending set-IP commands.
    #[arg(long, global = true, default_value_t = barix::COMMAND_PORT)]
    command_port: u16,

    #[arg(long, global = true, default_value_t = Ipv4Addr::BROADCAST)]
    broadcast: Ipv4Addr,

    /// How long replies are collected after each probe.
    #[arg(long, global = true, default_value_t = 2000)]
    window_ms: u64,

    /// Pause between discovery rounds.
    #[arg(long, global = true, default_value_t = 5000)]
    interval_ms: u64,
}

impl From<NetworkArgs> for DiscoveryConfig {
    fn from(value: NetworkArgs) -> Self {
        Self {
            discovery_port: value.port,
            command_port: value.command_port,
            broadcast_ip: value.broadcast,
            collection_window: Duration::from_millis(value.window_ms),
            interval: Duration::from_millis(value.interval_ms),
        }
    }
}

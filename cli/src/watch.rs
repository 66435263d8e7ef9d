use crate::table;
use barix::Device;
use barix::Discovery;
use barix::DiscoveryConfig;
use barix::MacAddress;
use barix::Provisioner;
use barix::SharedRegistry;
use futures_channel::oneshot;
use futures_util::StreamExt;
use std::io::BufRead;
use std::io::Write;
use tokio_util::sync::CancellationToken;

/// Runs discovery in the background while the user picks devices to manage.
pub async fn watch(config: DiscoveryConfig) -> anyhow::Result<()> {
    let registry = SharedRegistry::default();
    let cancellation = CancellationToken::new();
    let (round_sender, mut rounds) = futures_channel::mpsc::unbounded();
    let discovery = Discovery::new(config.clone(), registry.clone());
    let discovery_task = tokio::spawn({
        let cancellation = cancellation.clone();
        async move { discovery.run(cancellation, round_sender).await }
    });

    let mut session = Session {
        registry,
        provisioner: Provisioner::new(config),
        prompt: Prompt::Select,
    };
    session.show();
    let mut line = read_line();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(_) = rounds.next() => {
                if session.prompt == Prompt::Select {
                    session.show();
                }
            }
            input = &mut line => {
                match input? {
                    Ok(Some(input)) => session.handle(input.trim()).await,
                    Ok(None) => break,
                    Err(e) => return Err(e.into()),
                }
                session.show();
                line = read_line();
            }
        }
    }

    cancellation.cancel();
    discovery_task.await?;
    Ok(())
}

/// Reads one line from standard input on a separate thread.
///
/// Nothing reads the terminal until the next call, so child processes such as
/// SSH get all of the input in between.
fn read_line() -> oneshot::Receiver<std::io::Result<Option<String>>> {
    let (sender, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::default();
        let result = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map(|size| (size > 0).then_some(line));
        let _ = sender.send(result);
    });
    receiver
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Prompt {
    Select,
    Action(MacAddress),
    SshUser(MacAddress),
    NewIp(MacAddress),
    Acknowledge,
}

struct Session {
    registry: SharedRegistry,
    provisioner: Provisioner<barix::TokioUdpSender>,
    prompt: Prompt,
}

impl Session {
    async fn handle(&mut self, input: &str) {
        self.prompt = match self.prompt {
            Prompt::Select => self.select(input),
            Prompt::Action(mac) => self.act(mac, input),
            Prompt::SshUser(mac) => {
                match self.registry.find(mac) {
                    Some(device) if !input.is_empty() => {
                        if let Err(e) = crate::action::ssh(device.ip, input).await {
                            println!("{}", e);
                        }
                    }
                    _ => {}
                }
                Prompt::Select
            }
            Prompt::NewIp(mac) => {
                if !input.is_empty() {
                    self.set_ip(mac, input).await;
                }
                Prompt::Acknowledge
            }
            Prompt::Acknowledge => Prompt::Select,
        };
    }

    fn select(&self, input: &str) -> Prompt {
        let device = input
            .parse()
            .ok()
            .and_then(|number| self.registry.get(number).map(|device| (number, device)));
        match device {
            Some((number, device)) => {
                println!();
                println!("Selected device {}", table::render_row(number, &device));
                println!("What would you like to do with this device?");
                println!("  1) SSH into device");
                println!("  2) Change IP address now (UDP SET)");
                println!("  3) Open Web UI to configure");
                println!("  4) Cancel and return to discovery");
                Prompt::Action(device.mac)
            }
            None => Prompt::Select,
        }
    }

    fn act(&self, mac: MacAddress, input: &str) -> Prompt {
        let Some(device) = self.registry.find(mac) else {
            return Prompt::Select;
        };
        match input {
            "1" => Prompt::SshUser(mac),
            "2" => {
                println!("Enter the NEW IP address for this device.");
                Prompt::NewIp(mac)
            }
            "3" => {
                self.open_web_ui(device);
                Prompt::Acknowledge
            }
            _ => Prompt::Select,
        }
    }

    async fn set_ip(&self, mac: MacAddress, input: &str) {
        match self.provisioner.set_device_ip(&mac.octets(), input).await {
            Ok(ip) => {
                self.registry.update_ip(mac, ip);
                println!("Sent SET IP command: {} -> {}", mac, ip);
            }
            Err(e) => println!("Failed to send SET IP command: {}", e),
        }
    }

    fn open_web_ui(&self, device: Device) {
        let url = crate::action::web_ui_url(device.ip);
        println!(
            "Opening {} in your default browser so you can configure the device.",
            url
        );
        if let Err(e) = crate::action::open_browser(&url) {
            println!(
                "Could not open browser automatically. Please open {} manually. ({})",
                url, e
            );
        }
    }

    /// Prints the prompt of the current step, preceded by the device table when selecting.
    fn show(&self) {
        if self.prompt == Prompt::Select {
            table::clear_screen();
            println!("Discovering Barix devices (CTRL-C to stop)");
            println!("{}", table::render(&self.registry.list()));
        }
        let text = match self.prompt {
            Prompt::Select => {
                "Select device number to manage (or press Enter to refresh): ".to_string()
            }
            Prompt::Action(_) => "Enter choice [1-4]: ".to_string(),
            Prompt::SshUser(_) => "SSH username: ".to_string(),
            Prompt::NewIp(mac) => match self.registry.find(mac) {
                Some(device) => format!("New IP for {} (current {}): ", mac, device.ip),
                None => format!("New IP for {}: ", mac),
            },
            Prompt::Acknowledge => "\nPress Enter to return to discovery...".to_string(),
        };
        print!("{}", text);
        let _ = std::io::stdout().flush();
    }
}

use barix::Device;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn clear_screen() {
    print!("{}", CLEAR_SCREEN);
}

pub fn render(devices: &[Device]) -> String {
    let header = format!("{:>2}  {:<15}  {:<17}", "#", "Device IP", "MAC Address");
    let mut lines = vec![header.clone(), "-".repeat(header.len())];
    if devices.is_empty() {
        lines.push("No devices found yet.".into());
    }
    lines.extend(
        devices
            .iter()
            .enumerate()
            .map(|(index, device)| render_row(index + 1, device)),
    );
    lines.join("\n")
}

pub fn render_row(number: usize, device: &Device) -> String {
    format!(
        "{:>2}) {:<15}  {:<17}",
        number,
        device.ip.to_string(),
        device.mac.to_string()
    )
}

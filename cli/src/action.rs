use crate::process::ProcessError;
use std::net::Ipv4Addr;
use thiserror::Error;

const WINDOWS_SSH_CLIENTS: [&str; 3] = ["ssh", "putty", "plink"];

/// Opens an interactive SSH session and returns once it ends.
pub async fn ssh(ip: Ipv4Addr, username: &str) -> Result<(), ActionError> {
    let target = format!("{}@{}", username, ip);
    let client = if cfg!(windows) {
        WINDOWS_SSH_CLIENTS
            .into_iter()
            .find(|client| crate::process::find_executable(client).is_some())
            .ok_or(ActionError::NoSshClient)?
    } else {
        // Drop stale host keys left by earlier devices at this address.
        let ip = ip.to_string();
        if !crate::process::probe("ssh-keygen", &["-R", ip.as_str()]).await {
            log::debug!("Could not remove {} from known hosts", ip);
        }
        "ssh"
    };
    log::info!("Running {} {}", client, target);
    let status = crate::process::run_attached(client, &[target.as_str()]).await?;
    if !status.success() {
        log::info!("{} exited with {}", client, status);
    }
    Ok(())
}

pub fn web_ui_url(ip: Ipv4Addr) -> String {
    format!("http://{}/", ip)
}

pub fn open_browser(url: &str) -> Result<(), ActionError> {
    if cfg!(windows) {
        crate::process::start("rundll32", &["url.dll,FileProtocolHandler", url])?;
    } else if cfg!(target_os = "macos") {
        crate::process::start("open", &[url])?;
    } else {
        crate::process::start("xdg-open", &[url])?;
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("No SSH client found on PATH (tried ssh, putty, plink)")]
    NoSshClient,

    #[error("Failed to run an external command")]
    ChildProcess(#[from] ProcessError),
}

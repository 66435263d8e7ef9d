use std::path::PathBuf;
use std::process::ExitStatus;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Runs a command attached to the current terminal and waits for it.
pub async fn run_attached(command: &str, args: &[&str]) -> Result<ExitStatus, ProcessError> {
    let status = Command::new(command)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;
    Ok(status)
}

/// Runs a command with no terminal I/O and reports whether it succeeded.
pub async fn probe(command: &str, args: &[&str]) -> bool {
    let status = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match status {
        Ok(s) if s.success() => true,
        Ok(_) => {
            log::debug!("Command {} exited with failure", command);
            false
        }
        Err(e) => {
            log::debug!("Failed to spawn process of command {}: {}", command, e);
            false
        }
    }
}

/// Starts a command without waiting for it to exit.
pub fn start(command: &str, args: &[&str]) -> Result<(), ProcessError> {
    Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

pub fn find_executable(command: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|directory| {
            [
                directory.join(command),
                directory.join(format!("{}.exe", command)),
            ]
        })
        .find(|candidate| candidate.is_file())
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to create a child process")]
    ChildProcessCreation(#[from] std::io::Error),
}

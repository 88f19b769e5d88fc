// ABOUTME: Runs AppleScript through osascript for the macOS terminal presenters

use super::PresenterError;
use std::process::{Command, Stdio};
use tracing::debug;

/// Run a script whose `on run argv` handler receives `args`.
pub fn run_osascript(script: &str, args: &[&str]) -> Result<String, PresenterError> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                PresenterError::PresenterUnavailable("osascript not found".to_string())
            }
            _ => PresenterError::IoError(e),
        })?;

    if !output.status.success() {
        return Err(PresenterError::ScriptFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("osascript returned {:?}", stdout);
    Ok(stdout)
}

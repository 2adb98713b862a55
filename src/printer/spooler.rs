//! Raw printing through the CUPS spooler

use std::io::Write;
use std::process::{Command, Stdio};
use log::debug;
use crate::{Error, Result};
use super::Transport;

/// Names of the destinations registered in the spooler, deduplicated, in listing order
///
/// Fails with [SpoolerUnavailable](crate::Error::SpoolerUnavailable) when `lpstat` cannot be executed.
pub fn list_destinations() -> Result<Vec<String>> {
    let output = Command::new("lpstat")
        .arg("-e")
        .output()
        .map_err(|e| Error::SpoolerUnavailable(format!("could not run lpstat: {}", e)))?;
    if !output.status.success() {
        // Also the answer when no destination was ever added
        debug!("lpstat exited with {}: {}", output.status, String::from_utf8_lossy(&output.stderr).trim());
    }
    Ok(parse_destinations(&String::from_utf8_lossy(&output.stdout)))
}

pub(crate) fn parse_destinations(listing: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in listing.lines().filter_map(|line| line.split_whitespace().next()) {
        if !names.iter().any(|known| known == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Connection to a spooler destination
///
/// Writes are buffered, and the whole stream is submitted as a single raw job on close.
pub struct SpoolerConnection {
    name: String,
    buffer: Vec<u8>
}

impl SpoolerConnection {
    pub fn open<A: Into<String>>(name: A) -> Result<SpoolerConnection> {
        let name = name.into();
        if !list_destinations()?.contains(&name) {
            return Err(Error::InvalidTarget(format!("\"{}\" is not a spooler destination", name)));
        }
        Ok(SpoolerConnection {
            name,
            buffer: Vec::new()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Transport for SpoolerConnection {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let buffer = std::mem::take(&mut self.buffer);
        if buffer.is_empty() {
            return Ok(());
        }
        let mut command = Command::new("lp");
        command.args(["-d", &self.name, "-o", "raw"]);
        submit(command, &buffer)?;
        debug!("Submitted {} bytes to {}", buffer.len(), self.name);
        Ok(())
    }
}

/// Pipes a raw job into a spooler command, and waits for it to exit
///
/// The child is always waited for, even when feeding it failed.
fn submit(mut command: Command, job: &[u8]) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::SpoolerUnavailable(format!("could not run {}: {}", program, e)))?;
    // Dropping stdin at the end of the match lets the command see the end of the job
    let fed = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(job),
        None => Ok(())
    };
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(Error::WriteFailure(format!(
            "{} exited with {}: {}", program, output.status, String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    fed.map_err(|e| Error::WriteFailure(format!("could not feed {}: {}", program, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_are_deduplicated() {
        let listing = "Kitchen\nOffice_Thermal\n\nKitchen\n";
        assert_eq!(vec!["Kitchen", "Office_Thermal"], parse_destinations(listing));
        assert!(parse_destinations("").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn submission_waits_for_the_command() {
        assert!(submit(Command::new("cat"), b"receipt").is_ok());
        // Exits without reading, the job cannot be fed or the status is a failure
        assert!(matches!(submit(Command::new("false"), &vec![0u8; 1 << 20]), Err(Error::WriteFailure(_))));
        assert!(matches!(submit(Command::new("true"), &vec![0u8; 1 << 20]), Err(Error::WriteFailure(_))));
        assert!(matches!(
            submit(Command::new("surely-not-a-spooler-command"), b"x"),
            Err(Error::SpoolerUnavailable(_))
        ));
    }
}

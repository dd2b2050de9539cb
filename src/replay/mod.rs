//! Event script replay
//!
//! Drives a [`TopicManager`] from a line-oriented script so subscription
//! behavior can be reproduced outside a live broker:
//!
//! ```text
//! # comment
//! sub sensors/+/temp
//! has sensors/42/temp
//! unsub sensors/+/temp
//! size
//! sleep 1.5
//! sweep
//! ```

use std::fmt;
use std::io::Write;
use std::time::Duration;

use tracing::debug;

use crate::manager::TopicManager;

#[cfg(test)]
mod tests;

/// Replay error types
#[derive(Debug)]
pub enum ReplayError {
    /// Script line could not be parsed
    Parse { line: usize, message: String },
    /// Writing results failed
    Io(std::io::Error),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Parse { line, message } => write!(f, "line {}: {}", line, message),
            ReplayError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        ReplayError::Io(e)
    }
}

/// One script step
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Subscribe(String),
    Unsubscribe(String),
    HasSubscribers(String),
    Size,
    Sweep,
    Sleep(Duration),
}

impl Command {
    /// Parse one line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "sub" => Command::Subscribe(required(verb, arg)?),
            "unsub" => Command::Unsubscribe(required(verb, arg)?),
            "has" => Command::HasSubscribers(required(verb, arg)?),
            "size" => Command::Size,
            "sweep" => Command::Sweep,
            "sleep" => {
                let secs: f64 = required(verb, arg)?
                    .parse()
                    .map_err(|_| format!("invalid sleep duration '{}'", arg))?;
                let duration = Duration::try_from_secs_f64(secs)
                    .map_err(|_| format!("invalid sleep duration '{}'", arg))?;
                Command::Sleep(duration)
            }
            other => return Err(format!("unknown command '{}'", other)),
        };

        Ok(Some(command))
    }
}

fn required(verb: &str, arg: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("'{}' needs an argument", verb))
    } else {
        Ok(arg.to_string())
    }
}

/// Parse a whole script, reporting the first bad line
pub fn parse_script(script: &str) -> Result<Vec<Command>, ReplayError> {
    let mut commands = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        match Command::parse(line) {
            Ok(Some(command)) => commands.push(command),
            Ok(None) => {}
            Err(message) => {
                return Err(ReplayError::Parse {
                    line: idx + 1,
                    message,
                })
            }
        }
    }
    Ok(commands)
}

/// Apply `commands` in order, writing query results to `out`
pub async fn run<W: Write>(
    manager: &TopicManager,
    commands: &[Command],
    out: &mut W,
) -> Result<(), ReplayError> {
    for command in commands {
        debug!("Replaying {:?}", command);
        match command {
            Command::Subscribe(filter) => manager.subscribe(filter),
            Command::Unsubscribe(filter) => manager.unsubscribe(filter),
            Command::HasSubscribers(topic) => {
                writeln!(out, "has {} {}", topic, manager.has_subscribers(topic))?;
            }
            Command::Size => {
                let stats = manager.stats();
                writeln!(
                    out,
                    "size {} (active {})",
                    stats.tracked_filters, stats.active_filters
                )?;
            }
            Command::Sweep => {
                writeln!(out, "sweep removed {}", manager.sweep_now())?;
            }
            Command::Sleep(duration) => tokio::time::sleep(*duration).await,
        }
    }
    out.flush()?;
    Ok(())
}

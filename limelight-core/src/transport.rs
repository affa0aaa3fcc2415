//! Line transports for talking to an external engine.
//!
//! Provides NDJSON framing over two kinds of pipe:
//! - [`ProcessTransport`]: the stdin/stdout of a spawned engine process
//! - [`ChannelTransport`]: in-process tokio mpsc channels (for testing)

use crate::error::LimeError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;

/// Reads and writes one JSON message per line.
#[async_trait]
pub trait Transport: Send {
    /// Next message, or `Ok(None)` once the peer has closed its end.
    async fn read_message(&mut self) -> Result<Option<String>, LimeError>;

    /// Write one message; the transport adds the framing newline.
    async fn write_message(&mut self, message: &str) -> Result<(), LimeError>;

    async fn close(&mut self) -> Result<(), LimeError>;
}

/// Transport over the pipes of a child process.
pub struct ProcessTransport {
    child_stdin: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
}

impl std::fmt::Debug for ProcessTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessTransport").finish()
    }
}

impl ProcessTransport {
    /// Spawn `command` and connect to its stdin/stdout.
    ///
    /// The child's stderr is left piped on the returned handle so the caller
    /// can drain it. The child is killed if the handle is dropped.
    pub async fn spawn(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<(Self, Child), LimeError> {
        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LimeError::engine(format!("Failed to spawn {command}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LimeError::engine("Failed to capture engine stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LimeError::engine("Failed to capture engine stdout"))?;

        Ok((
            Self {
                child_stdin: Some(stdin),
                reader: BufReader::new(stdout),
            },
            child,
        ))
    }
}

#[async_trait]
impl Transport for ProcessTransport {
    async fn read_message(&mut self) -> Result<Option<String>, LimeError> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end().to_string()))
    }

    async fn write_message(&mut self, message: &str) -> Result<(), LimeError> {
        let stdin = self
            .child_stdin
            .as_mut()
            .ok_or_else(|| LimeError::protocol("write after close"))?;
        stdin.write_all(message.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Closes the engine's stdin so it sees EOF.
    async fn close(&mut self) -> Result<(), LimeError> {
        if let Some(mut stdin) = self.child_stdin.take() {
            stdin.flush().await?;
        }
        Ok(())
    }
}

/// In-process transport backed by tokio mpsc channels.
pub struct ChannelTransport {
    receiver: mpsc::Receiver<String>,
    sender: Option<mpsc::Sender<String>>,
}

impl ChannelTransport {
    /// Two connected ends: what one writes, the other reads.
    pub fn pair(capacity: usize) -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel(capacity);
        let (b_tx, b_rx) = mpsc::channel(capacity);
        (
            Self {
                receiver: a_rx,
                sender: Some(b_tx),
            },
            Self {
                receiver: b_rx,
                sender: Some(a_tx),
            },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn read_message(&mut self) -> Result<Option<String>, LimeError> {
        Ok(self.receiver.recv().await)
    }

    async fn write_message(&mut self, message: &str) -> Result<(), LimeError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| LimeError::protocol("write after close"))?;
        sender
            .send(message.to_string())
            .await
            .map_err(|_| LimeError::protocol("peer closed the channel"))
    }

    async fn close(&mut self) -> Result<(), LimeError> {
        self.sender = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_pair_roundtrip() {
        let (mut host, mut engine) = ChannelTransport::pair(4);
        host.write_message("{\"type\":\"ping\"}").await.unwrap();
        assert_eq!(
            engine.read_message().await.unwrap().as_deref(),
            Some("{\"type\":\"ping\"}")
        );
        engine.write_message("pong").await.unwrap();
        assert_eq!(host.read_message().await.unwrap().as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn test_channel_close_signals_eof() {
        let (mut host, mut engine) = ChannelTransport::pair(4);
        host.close().await.unwrap();
        assert!(engine.read_message().await.unwrap().is_none());
        assert!(host.write_message("late").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_transport_echo() {
        let (mut transport, mut child) =
            ProcessTransport::spawn("cat", &[], &HashMap::new()).await.unwrap();
        transport.write_message("{\"hello\":1}").await.unwrap();
        assert_eq!(
            transport.read_message().await.unwrap().as_deref(),
            Some("{\"hello\":1}")
        );
        transport.close().await.unwrap();
        assert!(transport.read_message().await.unwrap().is_none());
        assert!(child.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_spawn_missing_command() {
        let err = ProcessTransport::spawn("limelight-no-such-engine", &[], &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LimeError::Engine(_)));
    }
}

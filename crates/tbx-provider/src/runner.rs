//! Subprocess runner trait and the tokio-backed implementation

use crate::{Invocation, ProviderError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long output is still forwarded after a cancelled process was killed.
/// Descendants that inherited the pipes can keep them open indefinitely.
const CANCEL_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Process exited on its own with this code
    Normal(i32),
    /// Killed by a signal, crashed, or could not be waited on
    Abnormal,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        *self == ExitOutcome::Normal(0)
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitOutcome::Normal(code),
            None => ExitOutcome::Abnormal,
        }
    }
}

impl std::fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitOutcome::Normal(code) => write!(f, "exit code {}", code),
            ExitOutcome::Abnormal => write!(f, "abnormal exit"),
        }
    }
}

/// Captured result of a query-style invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    pub stdout: String,
    pub stderr: String,
    pub outcome: ExitOutcome,
}

impl QueryOutput {
    pub fn success(&self) -> bool {
        self.outcome.success()
    }

    /// Turn a failed query into a [`ProviderError::CommandFailed`]
    pub fn require_success(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(ProviderError::CommandFailed {
                status: self.outcome.to_string(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Asynchronous events of a tracked process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A chunk of standard output
    Stdout(String),
    /// A chunk of standard error
    Stderr(String),
    /// The process ended; always the last event
    Exited(ExitOutcome),
}

/// Receiving end of a spawned process
pub type ProcessStream = mpsc::UnboundedReceiver<ProcessEvent>;

/// Runs external commands on behalf of the dispatcher
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture output.
    ///
    /// The child is killed when `timeout` elapses or `cancel` fires.
    async fn query(
        &self,
        invocation: &Invocation,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueryOutput>;

    /// Start a process and stream its output.
    ///
    /// Output events are delivered in order, followed by exactly one
    /// [`ProcessEvent::Exited`]. Cancelling `cancel` kills the child.
    fn spawn(&self, invocation: &Invocation, cancel: CancellationToken) -> Result<ProcessStream>;
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct CliRunner;

impl CliRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_error(invocation: &Invocation, e: std::io::Error) -> ProviderError {
        ProviderError::SpawnError {
            program: invocation.program.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl CommandRunner for CliRunner {
    async fn query(
        &self,
        invocation: &Invocation,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueryOutput> {
        tracing::debug!("Query: {}", invocation);

        let child = invocation
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
                Ok(output) => output?,
                Err(_) => {
                    tracing::warn!("Timeout after {:?} running {}", timeout, invocation);
                    return Err(ProviderError::Timeout(timeout));
                }
            },
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        };

        Ok(QueryOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            outcome: ExitOutcome::from(output.status),
        })
    }

    fn spawn(&self, invocation: &Invocation, cancel: CancellationToken) -> Result<ProcessStream> {
        tracing::debug!("Spawn: {}", invocation);

        let mut child = invocation
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::spawn_error(invocation, e))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let program = invocation.program.clone();

        tokio::spawn(async move {
            let out_task = stdout.map(|s| tokio::spawn(forward(s, tx.clone(), ProcessEvent::Stdout)));
            let err_task = stderr.map(|s| tokio::spawn(forward(s, tx.clone(), ProcessEvent::Stderr)));

            let outcome = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => ExitOutcome::from(status),
                    Err(e) => {
                        tracing::warn!("Failed to wait on {}: {}", program, e);
                        ExitOutcome::Abnormal
                    }
                },
                _ = cancel.cancelled() => {
                    tracing::info!("Cancelling {}", program);
                    if let Err(e) = child.kill().await {
                        tracing::warn!("Failed to kill {}: {}", program, e);
                    }
                    ExitOutcome::Abnormal
                }
            };

            // Drain remaining output so Exited is always the final event
            let mut forwarders: Vec<JoinHandle<()>> =
                [out_task, err_task].into_iter().flatten().collect();
            let drain = async {
                for task in forwarders.iter_mut() {
                    let _ = task.await;
                }
            };
            let grace = async {
                cancel.cancelled().await;
                tokio::time::sleep(CANCEL_DRAIN_GRACE).await;
            };
            tokio::select! {
                _ = drain => {}
                _ = grace => tracing::warn!("Output of {} still open after cancel, dropping it", program),
            }
            for task in &forwarders {
                task.abort();
            }

            tracing::debug!("{} finished: {}", program, outcome);
            let _ = tx.send(ProcessEvent::Exited(outcome));
        });

        Ok(rx)
    }
}

/// Forward a child pipe to the event channel chunk by chunk
async fn forward<R>(
    mut reader: R,
    tx: mpsc::UnboundedSender<ProcessEvent>,
    wrap: fn(String) -> ProcessEvent,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    let mut chunker = Utf8Chunker::default();
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let Some(text) = chunker.push(&buf[..n]) else {
                    continue;
                };
                if tx.send(wrap(text)).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!("Error reading process output: {}", e);
                break;
            }
        }
    }
    if let Some(text) = chunker.finish() {
        let _ = tx.send(wrap(text));
    }
}

/// Decodes a byte stream read in arbitrary chunks, holding back a multibyte
/// character split across reads until its remaining bytes arrive
#[derive(Debug, Default)]
struct Utf8Chunker {
    pending: Vec<u8>,
}

impl Utf8Chunker {
    fn push(&mut self, bytes: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(bytes);
        let keep = incomplete_tail(&self.pending);
        let tail = self.pending.split_off(self.pending.len() - keep);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = tail;
        (!text.is_empty()).then_some(text)
    }

    /// Whatever is left at end of stream, decoded lossily
    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(text)
    }
}

/// Number of trailing bytes that start a UTF-8 sequence not yet complete
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let needed = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return 0,
        };
        return if back < needed { back } else { 0 };
    }
    0
}

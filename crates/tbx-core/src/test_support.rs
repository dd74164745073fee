//! Test support utilities for tbx-core
//!
//! Provides MockRunner and RecordingSurface for unit testing the Dispatcher
//! without invoking real container tools.

use crate::{Dispatcher, DisplaySurface};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tbx_config::{DefaultsConfig, ToolsConfig};
use tbx_provider::{
    CommandRunner, ExecutionContext, ExitOutcome, Invocation, InvocationBuilder, ProcessEvent,
    ProcessStream, ProviderError, QueryOutput, Result, LIST_FORMAT, RUNNING_FORMAT,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Records which methods were called on the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Query(Invocation),
    Spawn(Invocation),
}

/// Configurable mock runner for testing
pub struct MockRunner {
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    /// Reply to enumeration queries
    pub list_output: Arc<Mutex<QueryOutput>>,
    /// Reply to running-state queries
    pub running_output: Arc<Mutex<QueryOutput>>,
    /// Reply to any other query
    pub other_output: Arc<Mutex<QueryOutput>>,
    /// Every query fails with a timeout when set
    pub queries_time_out: Arc<Mutex<bool>>,
    /// Every query sleeps this long (or until cancelled) before replying
    pub query_delay: Arc<Mutex<Option<Duration>>>,
    /// Events replayed by each spawned process
    pub spawn_events: Arc<Mutex<Vec<ProcessEvent>>>,
    /// Spawn fails with this reason when set
    pub spawn_error: Arc<Mutex<Option<String>>>,
    /// Keep spawned processes in flight until `release` is called
    pub hold: Arc<Mutex<bool>>,
    held: Arc<Mutex<Vec<mpsc::UnboundedSender<ProcessEvent>>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a mock where every command succeeds and containers are running
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            list_output: Arc::new(Mutex::new(mock_output("", 0))),
            running_output: Arc::new(Mutex::new(mock_output("true\n", 0))),
            other_output: Arc::new(Mutex::new(mock_output("", 0))),
            queries_time_out: Arc::new(Mutex::new(false)),
            query_delay: Arc::new(Mutex::new(None)),
            spawn_events: Arc::new(Mutex::new(vec![ProcessEvent::Exited(
                ExitOutcome::Normal(0),
            )])),
            spawn_error: Arc::new(Mutex::new(None)),
            hold: Arc::new(Mutex::new(false)),
            held: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_list(&self, stdout: &str) {
        *self.list_output.lock().unwrap() = mock_output(stdout, 0);
    }

    pub fn set_running(&self, stdout: &str) {
        *self.running_output.lock().unwrap() = mock_output(stdout, 0);
    }

    /// Make the running-state query exit 125 with `stderr`
    pub fn fail_running(&self, stderr: &str) {
        *self.running_output.lock().unwrap() = QueryOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            outcome: ExitOutcome::Normal(125),
        };
    }

    pub fn time_out_queries(&self) {
        *self.queries_time_out.lock().unwrap() = true;
    }

    pub fn delay_queries(&self, delay: Duration) {
        *self.query_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_spawn_events(&self, events: Vec<ProcessEvent>) {
        *self.spawn_events.lock().unwrap() = events;
    }

    pub fn fail_spawn(&self, reason: &str) {
        *self.spawn_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn hold_spawns(&self) {
        *self.hold.lock().unwrap() = true;
    }

    /// Finish every held process with `outcome`
    pub fn release(&self, outcome: ExitOutcome) {
        for tx in self.held.lock().unwrap().drain(..) {
            let _ = tx.send(ProcessEvent::Exited(outcome));
        }
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.get_calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Query(_)))
            .count()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn query(
        &self,
        invocation: &Invocation,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueryOutput> {
        self.record(MockCall::Query(invocation.clone()));

        let delay = *self.query_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            }
        }
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        if *self.queries_time_out.lock().unwrap() {
            return Err(ProviderError::Timeout(timeout));
        }

        let reply = if invocation.args.iter().any(|a| a == LIST_FORMAT) {
            &self.list_output
        } else if invocation.args.iter().any(|a| a == RUNNING_FORMAT) {
            &self.running_output
        } else {
            &self.other_output
        };
        Ok(reply.lock().unwrap().clone())
    }

    fn spawn(&self, invocation: &Invocation, _cancel: CancellationToken) -> Result<ProcessStream> {
        self.record(MockCall::Spawn(invocation.clone()));

        if let Some(reason) = self.spawn_error.lock().unwrap().clone() {
            return Err(ProviderError::SpawnError {
                program: invocation.program.clone(),
                reason,
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        if *self.hold.lock().unwrap() {
            self.held.lock().unwrap().push(tx);
        } else {
            for event in self.spawn_events.lock().unwrap().iter() {
                let _ = tx.send(event.clone());
            }
        }
        Ok(rx)
    }
}

/// Create a QueryOutput with the given stdout and exit code
pub fn mock_output(stdout: &str, code: i32) -> QueryOutput {
    QueryOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        outcome: ExitOutcome::Normal(code),
    }
}

/// Dispatcher over a mock runner with default tools and settings
pub fn dispatcher_with(runner: Arc<MockRunner>, context: ExecutionContext) -> Dispatcher {
    Dispatcher::new(
        runner,
        InvocationBuilder::new(ToolsConfig::default(), context),
        DefaultsConfig::default(),
    )
}

/// Surface that records everything it is shown
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub messages: Vec<String>,
    pub output: Vec<String>,
    pub errors: Vec<String>,
    pub containers: Vec<String>,
    pub refreshes: usize,
}

impl RecordingSurface {
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl DisplaySurface for RecordingSurface {
    fn display_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn display_output(&mut self, output: &str) {
        self.output.push(output.to_string());
    }

    fn display_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn set_containers(&mut self, names: Vec<String>) {
        self.containers = names;
        self.refreshes += 1;
    }
}

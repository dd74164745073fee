//! Command dispatcher
//!
//! Translates an [`Intent`] plus a container name into an external process,
//! tracks at most one such process at a time and forwards its output and
//! completion to a [`DisplaySurface`].
//!
//! Auxiliary queries (running-state check, enumeration) run as background
//! tasks with a timeout and share one cancellation token. Their replies come
//! back through [`Dispatcher::next_event`] next to the process events, so the
//! caller's loop never blocks on a query.

use crate::{
    parse_container_list, parse_running_state, CoreError, DispatchState, DisplaySurface, Intent,
    Result, RunningState,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tbx_config::{DefaultsConfig, GlobalConfig};
use tbx_provider::{
    CliRunner, CommandRunner, ExecutionContext, ExitOutcome, Invocation, InvocationBuilder,
    ProcessEvent, ProcessStream, QueryOutput,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Status text shown after a successful command
pub const SUCCESS_MESSAGE: &str = "Command executed successfully.";

/// Result of a query that ran in the background
#[derive(Debug)]
pub enum QueryReply {
    /// Running-state check for the intent being checked
    RunningState(Result<RunningState>),
    /// A stopped container was started ahead of opening a file
    Started(Result<()>),
    /// Container enumeration
    Containers(Result<Vec<String>>),
}

/// Work for the caller's loop to hand back to [`Dispatcher::handle_event`]
#[derive(Debug)]
pub enum DispatchEvent {
    Process(ProcessEvent),
    Query(QueryReply),
}

pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    invocations: InvocationBuilder,
    defaults: DefaultsConfig,
    state: DispatchState,
    events: Option<ProcessStream>,
    replies_tx: mpsc::UnboundedSender<QueryReply>,
    replies: mpsc::UnboundedReceiver<QueryReply>,
    pending_queries: usize,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        invocations: InvocationBuilder,
        defaults: DefaultsConfig,
    ) -> Self {
        let (replies_tx, replies) = mpsc::unbounded_channel();
        Self {
            runner,
            invocations,
            defaults,
            state: DispatchState::Idle,
            events: None,
            replies_tx,
            replies,
            pending_queries: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a dispatcher running real binaries, resolving the execution
    /// context from the sandbox settings once
    pub fn from_config(config: &GlobalConfig) -> Self {
        let context = ExecutionContext::resolve(&config.sandbox);
        tracing::info!("Running in {} context", context);
        Self::new(
            Arc::new(CliRunner::new()),
            InvocationBuilder::new(config.tools.clone(), context),
            config.defaults.clone(),
        )
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        !self.state.is_idle()
    }

    /// Idle with no background query outstanding
    pub fn is_settled(&self) -> bool {
        self.state.is_idle() && self.pending_queries == 0
    }

    pub fn context(&self) -> ExecutionContext {
        self.invocations.context()
    }

    /// Route an intent to its operation
    pub fn dispatch(
        &mut self,
        intent: Intent,
        name: &str,
        surface: &mut dyn DisplaySurface,
    ) -> Result<()> {
        match intent {
            Intent::Start => self.start(name, surface),
            Intent::Stop => self.stop(name, surface),
            Intent::Exec { command } => self.exec_in(name, &command, surface),
            Intent::Connect => self.connect(name, surface),
            Intent::OpenFile { path } => self.open_file(name, path.as_deref(), surface),
        }
    }

    /// Enter (and thereby start) a container
    pub fn start(&mut self, name: &str, surface: &mut dyn DisplaySurface) -> Result<()> {
        self.admit(&Intent::Start, name)?;
        surface.display_message(&format!("Starting container {}...", name));
        let invocation = self.invocations.enter(name);
        self.launch(Intent::Start, name, invocation, surface);
        Ok(())
    }

    /// Stop a container through the runtime
    pub fn stop(&mut self, name: &str, surface: &mut dyn DisplaySurface) -> Result<()> {
        self.admit(&Intent::Stop, name)?;
        surface.display_message(&format!("Stopping container {}...", name));
        let invocation = self.invocations.stop(name);
        self.launch(Intent::Stop, name, invocation, surface);
        Ok(())
    }

    /// Run `command` inside a container, or the configured shell when empty
    pub fn exec_in(
        &mut self,
        name: &str,
        command: &[String],
        surface: &mut dyn DisplaySurface,
    ) -> Result<()> {
        let intent = Intent::Exec {
            command: command.to_vec(),
        };
        self.admit(&intent, name)?;
        surface.display_message(&format!("Executing command in container {}...", name));
        let invocation = if command.is_empty() {
            self.invocations.enter_with(name, &self.shell_command())
        } else {
            self.invocations.enter_with(name, command)
        };
        self.launch(intent, name, invocation, surface);
        Ok(())
    }

    /// Attach a shell, starting the container first when it is stopped.
    ///
    /// Only validation happens here; the running check runs in the
    /// background and its reply decides which process is launched.
    pub fn connect(&mut self, name: &str, surface: &mut dyn DisplaySurface) -> Result<()> {
        self.admit(&Intent::Connect, name)?;
        surface.display_message(&format!("Connecting to container {}...", name));
        self.check_running(Intent::Connect, name);
        Ok(())
    }

    /// Open `path` with the configured editor inside a container
    pub fn open_file(
        &mut self,
        name: &str,
        path: Option<&Path>,
        surface: &mut dyn DisplaySurface,
    ) -> Result<()> {
        let intent = Intent::OpenFile {
            path: path.map(Path::to_path_buf),
        };
        self.admit(&intent, name)?;
        if path.is_none() {
            return Err(CoreError::NoActiveDocument);
        }
        surface.display_message(&format!("Checking container {}...", name));
        self.check_running(intent, name);
        Ok(())
    }

    /// Ask the runtime whether a container is running
    pub async fn is_running(&self, name: &str) -> Result<RunningState> {
        let output = self
            .query(&self.invocations.running_check(name))
            .await?
            .require_success()?;
        parse_running_state(name, &output.stdout)
    }

    /// Enumerate known containers
    pub async fn list_containers(&self) -> Result<Vec<String>> {
        let output = self
            .query(&self.invocations.enumerate())
            .await?
            .require_success()?;
        Ok(parse_container_list(&output.stdout))
    }

    /// Re-enumerate containers in the background; the reply updates the
    /// surface once handled
    pub fn request_refresh(&mut self) {
        let invocation = self.invocations.enumerate();
        self.spawn_query(invocation, |result| {
            QueryReply::Containers(
                result
                    .and_then(|output| output.require_success().map_err(CoreError::from))
                    .map(|output| parse_container_list(&output.stdout)),
            )
        });
    }

    /// Wait for the next process event or query reply.
    ///
    /// Never resolves while settled, so it can sit in a `select!` loop.
    pub async fn next_event(&mut self) -> DispatchEvent {
        let Self {
            events, replies, ..
        } = self;

        let process = async {
            match events {
                Some(rx) => rx
                    .recv()
                    .await
                    .unwrap_or(ProcessEvent::Exited(ExitOutcome::Abnormal)),
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            event = process => DispatchEvent::Process(event),
            Some(reply) = replies.recv() => DispatchEvent::Query(reply),
        }
    }

    /// Apply one event to the dispatcher and the surface.
    ///
    /// Returns the outcome once the tracked process has finished; a refresh
    /// of the container list has been requested by then.
    pub fn handle_event(
        &mut self,
        event: DispatchEvent,
        surface: &mut dyn DisplaySurface,
    ) -> Option<ExitOutcome> {
        match event {
            DispatchEvent::Process(ProcessEvent::Stdout(text)) => {
                surface.display_output(&text);
                None
            }
            DispatchEvent::Process(ProcessEvent::Stderr(text)) => {
                surface.display_error(&text);
                None
            }
            DispatchEvent::Process(ProcessEvent::Exited(outcome)) => {
                self.finish(outcome, surface);
                Some(outcome)
            }
            DispatchEvent::Query(reply) => {
                self.pending_queries = self.pending_queries.saturating_sub(1);
                self.handle_reply(reply, surface);
                None
            }
        }
    }

    /// Drive the current intent and any outstanding queries to completion.
    ///
    /// Returns the outcome of the tracked process, or `None` when no process
    /// finished (for example because the running check failed).
    pub async fn wait(&mut self, surface: &mut dyn DisplaySurface) -> Option<ExitOutcome> {
        let mut outcome = None;
        while !self.is_settled() {
            let event = self.next_event().await;
            if let Some(finished) = self.handle_event(event, surface) {
                outcome = Some(finished);
            }
        }
        outcome
    }

    /// Cancel pending queries and kill the tracked process
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn shell_command(&self) -> Vec<String> {
        vec![self.defaults.shell.clone()]
    }

    fn query_timeout(&self) -> Duration {
        self.defaults.query_timeout()
    }

    async fn query(&self, invocation: &Invocation) -> Result<QueryOutput> {
        Ok(self
            .runner
            .query(invocation, self.query_timeout(), &self.cancel)
            .await?)
    }

    /// Run a query on its own task and deliver `reply(result)` to `next_event`
    fn spawn_query<F>(&mut self, invocation: Invocation, reply: F)
    where
        F: FnOnce(Result<QueryOutput>) -> QueryReply + Send + 'static,
    {
        let runner = self.runner.clone();
        let timeout = self.query_timeout();
        let cancel = self.cancel.clone();
        let tx = self.replies_tx.clone();
        self.pending_queries += 1;

        tokio::spawn(async move {
            let result = runner
                .query(&invocation, timeout, &cancel)
                .await
                .map_err(CoreError::from);
            let _ = tx.send(reply(result));
        });
    }

    fn check_running(&mut self, intent: Intent, name: &str) {
        self.state = DispatchState::Checking {
            intent,
            container: name.to_string(),
        };
        let container = name.to_string();
        let invocation = self.invocations.running_check(name);
        self.spawn_query(invocation, move |result| {
            QueryReply::RunningState(
                result
                    .and_then(|output| output.require_success().map_err(CoreError::from))
                    .and_then(|output| parse_running_state(&container, &output.stdout)),
            )
        });
    }

    fn handle_reply(&mut self, reply: QueryReply, surface: &mut dyn DisplaySurface) {
        match reply {
            QueryReply::Containers(result) => Self::apply_containers(result, surface),
            QueryReply::RunningState(result) => {
                let Some((intent, container)) = self.take_checking() else {
                    return;
                };
                match result {
                    Ok(running) => self.proceed(intent, container, running, surface),
                    Err(e) => Self::abandon(&intent, &container, e, surface),
                }
            }
            QueryReply::Started(result) => {
                let Some((intent, container)) = self.take_checking() else {
                    return;
                };
                match (result, intent) {
                    (Ok(()), Intent::OpenFile { path: Some(path) }) => {
                        self.launch_open(&container, path, surface)
                    }
                    (Ok(()), intent) => {
                        tracing::warn!("Nothing to launch for {} on {}", intent, container)
                    }
                    (Err(e), intent) => Self::abandon(&intent, &container, e, surface),
                }
            }
        }
    }

    /// Leave the checking state, returning what was being checked
    fn take_checking(&mut self) -> Option<(Intent, String)> {
        match std::mem::take(&mut self.state) {
            DispatchState::Checking { intent, container } => Some((intent, container)),
            other => {
                tracing::debug!("Ignoring query reply while {}", other);
                self.state = other;
                None
            }
        }
    }

    /// Continue an intent once the container's running state is known
    fn proceed(
        &mut self,
        intent: Intent,
        container: String,
        running: RunningState,
        surface: &mut dyn DisplaySurface,
    ) {
        match (intent, running) {
            (Intent::Connect, RunningState::Stopped) => {
                surface.display_message("Container not running. Starting...");
                if let Err(e) = self.start(&container, surface) {
                    surface.display_error(&e.to_string());
                }
            }
            (Intent::Connect, RunningState::Running) => {
                let invocation = self
                    .invocations
                    .enter_with(&container, &self.shell_command());
                self.launch(Intent::Connect, &container, invocation, surface);
            }
            (Intent::OpenFile { path: Some(path) }, RunningState::Stopped) => {
                surface.display_message(&format!(
                    "Container not running. Starting {}...",
                    container
                ));
                let invocation = self.invocations.enter(&container);
                self.state = DispatchState::Checking {
                    intent: Intent::OpenFile { path: Some(path) },
                    container,
                };
                self.spawn_query(invocation, |result| {
                    QueryReply::Started(
                        result
                            .and_then(|output| output.require_success().map_err(CoreError::from))
                            .map(|_| ()),
                    )
                });
            }
            (Intent::OpenFile { path: Some(path) }, RunningState::Running) => {
                self.launch_open(&container, path, surface)
            }
            (intent, _) => {
                tracing::warn!("No follow-up for {} on {} after running check", intent, container)
            }
        }
    }

    fn launch_open(&mut self, container: &str, path: PathBuf, surface: &mut dyn DisplaySurface) {
        surface.display_message(&format!(
            "Opening {} in container {}...",
            path.display(),
            container
        ));
        let invocation = self
            .invocations
            .open_file(container, &self.defaults.editor, &path);
        self.launch(
            Intent::OpenFile { path: Some(path) },
            container,
            invocation,
            surface,
        );
    }

    fn abandon(intent: &Intent, container: &str, e: CoreError, surface: &mut dyn DisplaySurface) {
        tracing::warn!("{} {} abandoned: {}", intent, container, e);
        surface.display_error(&e.to_string());
    }

    fn apply_containers(result: Result<Vec<String>>, surface: &mut dyn DisplaySurface) {
        match result {
            Ok(names) => {
                tracing::debug!("Found {} containers", names.len());
                surface.set_containers(names);
            }
            Err(e) => {
                tracing::warn!("Failed to list containers: {}", e);
                surface.display_error(&format!("Failed to list containers: {}", e));
                surface.set_containers(Vec::new());
            }
        }
    }

    /// Validate the name and reject new work while an intent is in progress
    fn admit(&self, intent: &Intent, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CoreError::NoContainerSelected);
        }
        if let Some((running, container)) = self.state.active() {
            tracing::warn!("Rejecting {} on {}: busy with {}", intent, name, self.state);
            return Err(CoreError::Busy {
                requested: intent.clone(),
                running: running.clone(),
                container: container.to_string(),
            });
        }
        Ok(())
    }

    fn launch(
        &mut self,
        intent: Intent,
        name: &str,
        invocation: Invocation,
        surface: &mut dyn DisplaySurface,
    ) {
        tracing::info!("{} {}: {}", intent, name, invocation);

        let events = match self.runner.spawn(&invocation, self.cancel.child_token()) {
            Ok(events) => events,
            Err(e) => {
                // Spawn failures take the same completion path as failed commands
                tracing::warn!("{}", e);
                surface.display_error(&e.to_string());
                let (tx, rx) = mpsc::unbounded_channel();
                let _ = tx.send(ProcessEvent::Exited(ExitOutcome::Abnormal));
                rx
            }
        };

        self.events = Some(events);
        self.state = DispatchState::Running {
            intent,
            container: name.to_string(),
        };
    }

    fn finish(&mut self, outcome: ExitOutcome, surface: &mut dyn DisplaySurface) {
        match outcome {
            ExitOutcome::Normal(0) => surface.display_message(SUCCESS_MESSAGE),
            ExitOutcome::Normal(code) => {
                surface.display_error(&format!("Command failed with exit code {}.", code))
            }
            ExitOutcome::Abnormal => surface.display_error("Command terminated abnormally."),
        }

        tracing::info!("{} finished: {}", self.state, outcome);
        self.state = DispatchState::Idle;
        self.events = None;
        self.request_refresh();
    }
}

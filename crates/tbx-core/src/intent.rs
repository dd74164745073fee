//! User intents and dispatcher state

use std::path::PathBuf;

/// An action the user asked for on a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    Stop,
    /// Run a command inside the container; empty means the configured shell
    Exec { command: Vec<String> },
    Connect,
    /// Open a document inside the container; `None` when no document is active
    OpenFile { path: Option<PathBuf> },
}

impl Intent {
    pub fn exec_shell() -> Self {
        Intent::Exec {
            command: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Start => "start",
            Intent::Stop => "stop",
            Intent::Exec { .. } => "exec",
            Intent::Connect => "connect",
            Intent::OpenFile { .. } => "open",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What the dispatcher is doing for the current intent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DispatchState {
    #[default]
    Idle,
    /// Querying the container before the intent's process can start
    Checking { intent: Intent, container: String },
    /// The tracked process is in flight
    Running { intent: Intent, container: String },
}

impl DispatchState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DispatchState::Idle)
    }

    /// The intent and container being worked on, if any
    pub fn active(&self) -> Option<(&Intent, &str)> {
        match self {
            DispatchState::Idle => None,
            DispatchState::Checking { intent, container }
            | DispatchState::Running { intent, container } => Some((intent, container.as_str())),
        }
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchState::Idle => write!(f, "idle"),
            DispatchState::Checking { intent, container } => {
                write!(f, "{} {} (checking)", intent, container)
            }
            DispatchState::Running { intent, container } => {
                write!(f, "{} {}", intent, container)
            }
        }
    }
}

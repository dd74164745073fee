//! Parsing of external command output

use crate::{CoreError, Result};

/// Result of the runtime's running-state query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningState {
    Running,
    Stopped,
}

/// Split enumeration output into container names, dropping empty entries
pub fn parse_container_list(output: &str) -> Vec<String> {
    output
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret `{{.State.Running}}` output.
///
/// Only the literals `true` and `false` are accepted.
pub fn parse_running_state(container: &str, output: &str) -> Result<RunningState> {
    match output.trim() {
        "true" => Ok(RunningState::Running),
        "false" => Ok(RunningState::Stopped),
        other => Err(CoreError::UnexpectedRunningState {
            container: container.to_string(),
            output: other.to_string(),
        }),
    }
}

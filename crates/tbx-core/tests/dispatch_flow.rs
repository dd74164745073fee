//! End-to-end dispatcher tests against fake tool scripts.
//! These run real subprocesses but need no container runtime.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tbx_config::{DefaultsConfig, ToolsConfig};
use tbx_core::test_support::RecordingSurface;
use tbx_core::{Dispatcher, SUCCESS_MESSAGE};
use tbx_provider::{CliRunner, ExecutionContext, ExitOutcome, InvocationBuilder};

struct FakeTools {
    _dir: tempfile::TempDir,
    log: PathBuf,
    tools: ToolsConfig,
}

fn write_script(dir: &Path, name: &str, log: &Path, body: &str) -> String {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\necho \"{} $*\" >> '{}'\n{}\n",
        name,
        log.display(),
        body
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().to_string()
}

fn fake_tools() -> FakeTools {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("calls.log");

    let list = write_script(dir.path(), "list", &log, "printf 'alpha\\n\\nbeta\\n'");
    let runtime = write_script(
        dir.path(),
        "runtime",
        &log,
        "if [ \"$2\" = inspect ]; then echo false; else echo \"stopped $3\"; fi",
    );
    let entry = write_script(dir.path(), "entry", &log, "echo \"entered $*\"");
    let host_spawn = write_script(dir.path(), "host-spawn", &log, "shift\nexec \"$@\"");

    FakeTools {
        _dir: dir,
        log,
        tools: ToolsConfig {
            runtime,
            entry,
            list,
            host_spawn,
        },
    }
}

fn dispatcher(tools: &ToolsConfig, context: ExecutionContext) -> Dispatcher {
    Dispatcher::new(
        Arc::new(CliRunner::new()),
        InvocationBuilder::new(tools.clone(), context),
        DefaultsConfig::default(),
    )
}

#[tokio::test]
async fn test_connect_to_stopped_container_on_host() {
    let fake = fake_tools();
    let mut dispatcher = dispatcher(&fake.tools, ExecutionContext::Host);
    let mut surface = RecordingSurface::default();

    dispatcher.connect("alpha", &mut surface).unwrap();
    let outcome = dispatcher.wait(&mut surface).await;

    assert_eq!(outcome, Some(ExitOutcome::Normal(0)));
    assert_eq!(surface.output.concat(), "entered -n alpha\n");
    assert_eq!(surface.last_message(), Some(SUCCESS_MESSAGE));
    assert_eq!(surface.containers, ["alpha", "beta"]);
    assert_eq!(surface.refreshes, 1);

    let log = fs::read_to_string(&fake.log).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(
        calls,
        [
            "runtime container inspect -f {{.State.Running}} alpha",
            "entry -n alpha",
            "list -f {{.Name}}",
        ]
    );

    dispatcher.stop("alpha", &mut surface).unwrap();
    dispatcher.wait(&mut surface).await;
    assert!(surface.output.concat().ends_with("stopped alpha\n"));
}

#[tokio::test]
async fn test_sandboxed_invocations_go_through_host_spawn() {
    let fake = fake_tools();
    let mut dispatcher = dispatcher(&fake.tools, ExecutionContext::Sandboxed);
    let mut surface = RecordingSurface::default();

    dispatcher.exec_in("beta", &[], &mut surface).unwrap();
    let outcome = dispatcher.wait(&mut surface).await;
    assert_eq!(outcome, Some(ExitOutcome::Normal(0)));
    assert_eq!(surface.output.concat(), "entered -n beta bash\n");

    let log = fs::read_to_string(&fake.log).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(
        calls[0],
        format!("host-spawn --host {} -n beta bash", fake.tools.entry)
    );
    assert_eq!(calls[1], "entry -n beta bash");
    assert_eq!(
        calls[2],
        format!("host-spawn --host {} -f {{{{.Name}}}}", fake.tools.list)
    );
    assert_eq!(calls[3], "list -f {{.Name}}");
}

#[tokio::test]
async fn test_missing_binary_reports_failure_and_refreshes() {
    let fake = fake_tools();
    let mut tools = fake.tools.clone();
    tools.entry = "/nonexistent/tbx-entry".to_string();
    let mut dispatcher = dispatcher(&tools, ExecutionContext::Host);
    let mut surface = RecordingSurface::default();

    dispatcher.start("alpha", &mut surface).unwrap();
    let outcome = dispatcher.wait(&mut surface).await;

    assert_eq!(outcome, Some(ExitOutcome::Abnormal));
    assert!(surface.errors.iter().any(|e| e.contains("/nonexistent/tbx-entry")));
    assert_eq!(surface.containers, ["alpha", "beta"]);
}

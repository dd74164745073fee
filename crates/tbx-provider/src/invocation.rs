//! Argument assembly for every external command tbx runs
//!
//! All operations share one prefixing rule: inside a sandbox the binary is
//! relayed through `<host_spawn> --host <binary> ...`.

use crate::ExecutionContext;
use std::path::Path;
use tbx_config::ToolsConfig;

/// Format filter passed to the enumeration CLI
pub const LIST_FORMAT: &str = "{{.Name}}";

/// Format filter passed to the runtime's inspect subcommand
pub const RUNNING_FORMAT: &str = "{{.State.Running}}";

/// A fully resolved program + argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Shell-quoted command line, for logs and status text
    pub fn command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }

    /// Build a tokio command for this invocation (stdio is left to the caller)
    pub(crate) fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Builds invocations for the configured tools in a fixed execution context
#[derive(Debug, Clone)]
pub struct InvocationBuilder {
    tools: ToolsConfig,
    context: ExecutionContext,
}

impl InvocationBuilder {
    pub fn new(tools: ToolsConfig, context: ExecutionContext) -> Self {
        Self { tools, context }
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// `<list> -f {{.Name}}`
    pub fn enumerate(&self) -> Invocation {
        self.wrap(
            &self.tools.list,
            vec!["-f".to_string(), LIST_FORMAT.to_string()],
        )
    }

    /// `<entry> -n <name>`
    pub fn enter(&self, name: &str) -> Invocation {
        self.enter_with(name, &[])
    }

    /// `<entry> -n <name> <command...>`
    pub fn enter_with(&self, name: &str, command: &[String]) -> Invocation {
        let mut args = vec!["-n".to_string(), name.to_string()];
        args.extend(command.iter().cloned());
        self.wrap(&self.tools.entry, args)
    }

    /// `<runtime> container stop <name>`
    pub fn stop(&self, name: &str) -> Invocation {
        self.wrap(
            &self.tools.runtime,
            vec![
                "container".to_string(),
                "stop".to_string(),
                name.to_string(),
            ],
        )
    }

    /// `<runtime> container inspect -f {{.State.Running}} <name>`
    pub fn running_check(&self, name: &str) -> Invocation {
        self.wrap(
            &self.tools.runtime,
            vec![
                "container".to_string(),
                "inspect".to_string(),
                "-f".to_string(),
                RUNNING_FORMAT.to_string(),
                name.to_string(),
            ],
        )
    }

    /// `<entry> -n <name> <editor> <path>`
    pub fn open_file(&self, name: &str, editor: &str, path: &Path) -> Invocation {
        self.enter_with(
            name,
            &[editor.to_string(), path.to_string_lossy().to_string()],
        )
    }

    fn wrap(&self, binary: &str, args: Vec<String>) -> Invocation {
        match self.context {
            ExecutionContext::Host => Invocation::new(binary, args),
            ExecutionContext::Sandboxed => {
                let mut wrapped = Vec::with_capacity(args.len() + 2);
                wrapped.push("--host".to_string());
                wrapped.push(binary.to_string());
                wrapped.extend(args);
                Invocation::new(&self.tools.host_spawn, wrapped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> InvocationBuilder {
        InvocationBuilder::new(ToolsConfig::default(), ExecutionContext::Host)
    }

    fn sandboxed() -> InvocationBuilder {
        InvocationBuilder::new(ToolsConfig::default(), ExecutionContext::Sandboxed)
    }

    fn argv(inv: &Invocation) -> Vec<&str> {
        std::iter::once(inv.program.as_str())
            .chain(inv.args.iter().map(|s| s.as_str()))
            .collect()
    }

    #[test]
    fn test_start_on_host() {
        assert_eq!(argv(&host().enter("dev")), ["distrobox-enter", "-n", "dev"]);
    }

    #[test]
    fn test_stop_in_sandbox() {
        assert_eq!(
            argv(&sandboxed().stop("dev")),
            ["flatpak-spawn", "--host", "podman", "container", "stop", "dev"]
        );
    }

    #[test]
    fn test_stop_differs_only_by_prefix() {
        let plain = host().stop("dev");
        let wrapped = sandboxed().stop("dev");
        assert_eq!(wrapped.program, "flatpak-spawn");
        assert_eq!(wrapped.args[0], "--host");
        assert_eq!(&wrapped.args[1..], argv(&plain).as_slice());
    }

    #[test]
    fn test_exec_appends_command() {
        let inv = host().enter_with("dev", &["bash".to_string()]);
        assert_eq!(argv(&inv), ["distrobox-enter", "-n", "dev", "bash"]);
    }

    #[test]
    fn test_running_check() {
        assert_eq!(
            argv(&host().running_check("dev")),
            [
                "podman",
                "container",
                "inspect",
                "-f",
                "{{.State.Running}}",
                "dev"
            ]
        );
    }

    #[test]
    fn test_enumerate() {
        assert_eq!(argv(&host().enumerate()), ["distrobox-list", "-f", "{{.Name}}"]);
        assert_eq!(
            argv(&sandboxed().enumerate()),
            ["flatpak-spawn", "--host", "distrobox-list", "-f", "{{.Name}}"]
        );
    }

    #[test]
    fn test_open_file() {
        let inv = sandboxed().open_file("dev", "kate", Path::new("/home/me/notes.md"));
        assert_eq!(
            argv(&inv),
            [
                "flatpak-spawn",
                "--host",
                "distrobox-enter",
                "-n",
                "dev",
                "kate",
                "/home/me/notes.md"
            ]
        );
    }

    #[test]
    fn test_every_sandboxed_invocation_is_wrapped() {
        let b = sandboxed();
        let all = [
            b.enumerate(),
            b.enter("x"),
            b.enter_with("x", &["bash".to_string()]),
            b.stop("x"),
            b.running_check("x"),
            b.open_file("x", "kate", Path::new("f")),
        ];
        for inv in &all {
            assert_eq!(inv.program, "flatpak-spawn");
            assert_eq!(inv.args[0], "--host");
        }

        let b = host();
        let all = [b.enumerate(), b.enter("x"), b.stop("x"), b.running_check("x")];
        for inv in &all {
            assert_ne!(inv.program, "flatpak-spawn");
            assert!(!inv.args.contains(&"--host".to_string()));
        }
    }

    #[test]
    fn test_custom_tools() {
        let tools = ToolsConfig {
            runtime: "docker".to_string(),
            entry: "toolbox-enter".to_string(),
            list: "toolbox-list".to_string(),
            host_spawn: "host-spawn".to_string(),
        };
        let b = InvocationBuilder::new(tools, ExecutionContext::Sandboxed);
        assert_eq!(
            argv(&b.stop("dev")),
            ["host-spawn", "--host", "docker", "container", "stop", "dev"]
        );
    }

    #[test]
    fn test_command_line_quotes_arguments() {
        let inv = host().open_file("dev", "kate", Path::new("/tmp/my file.txt"));
        let line = inv.to_string();
        assert!(line.starts_with("distrobox-enter -n dev kate "));
        assert_eq!(shell_words::split(&line).unwrap(), argv(&inv));

        let inv = sandboxed().enumerate();
        assert_eq!(shell_words::split(&inv.command_line()).unwrap(), argv(&inv));
    }
}

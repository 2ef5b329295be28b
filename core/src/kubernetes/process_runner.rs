//! Subprocess runner for kubectl.
//!
//! Short-lived commands have their stdout captured; tunnels are spawned in
//! their own process group so that the whole tree can be torn down.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::errors::{KubectlError, Result};
use crate::ports::TunnelHandle;

/// Grace period between SIGTERM and SIGKILL when stopping a tunnel.
const KILL_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// Runs a fixed program, optionally with leading arguments (`minikube kubectl --`).
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    base_args: Vec<String>,
}

impl ProcessRunner {
    /// Creates a runner for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Creates a runner that prepends `base_args` to every invocation.
    pub fn with_args(program: impl Into<PathBuf>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }

    /// Runs to completion and returns stdout. Non-zero exit is an error.
    pub async fn output(&self, args: &[String]) -> Result<String> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.launch_error("run", e))?;

        if !output.status.success() {
            return Err(KubectlError::command_failed(args, &output.stderr));
        }

        String::from_utf8(output.stdout).map_err(|e| KubectlError::ParsingFailed(e.to_string()))
    }

    /// Spawns a long-running process without capturing its output.
    ///
    /// stderr is inherited so kubectl's own diagnostics reach the console.
    pub fn spawn(&self, args: &[String]) -> Result<TunnelProcess> {
        let mut command = self.command(args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        let child = command
            .spawn()
            .map_err(|e| self.launch_error("start", e))?;

        let pid = child.id();
        debug!(?pid, program = %self.program.display(), ?args, "Spawned process");
        Ok(TunnelProcess { child, pid })
    }

    fn launch_error(&self, action: &str, e: std::io::Error) -> KubectlError {
        if e.kind() == std::io::ErrorKind::NotFound {
            return KubectlError::KubectlNotFound;
        }
        KubectlError::ProcessError(format!(
            "Failed to {} {}: {}",
            action,
            self.program.display(),
            e
        ))
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.base_args).args(args);
        command
    }
}

/// A spawned tunnel process, leader of its own process group on unix.
#[derive(Debug)]
pub struct TunnelProcess {
    child: Child,
    // Kept separately: `Child::id` returns None once the child is reaped.
    pid: Option<u32>,
}

impl TunnelProcess {
    /// Waits for the process to exit.
    pub async fn wait_exit(&mut self) -> Result<Option<i32>> {
        let status = self.child.wait().await?;
        Ok(status.code())
    }

    /// Terminates the process and its descendants, then reaps it.
    pub async fn kill_tree(&mut self) -> Result<()> {
        #[cfg(unix)]
        if let Some(pid) = self.pid {
            use nix::sys::signal::Signal;

            signal_group(pid, Signal::SIGTERM);
            if tokio::time::timeout(KILL_GRACE_PERIOD, self.child.wait())
                .await
                .is_err()
            {
                debug!(pid, "Process ignored SIGTERM");
            }
            // Descendants may outlive the leader.
            signal_group(pid, Signal::SIGKILL);
        }

        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pid, ?signal, error = %e, "Failed to signal process group"),
    }
}

impl TunnelHandle for TunnelProcess {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> crate::error::Result<Option<i32>> {
        Ok(self.wait_exit().await?)
    }

    async fn kill(&mut self) -> crate::error::Result<()> {
        Ok(self.kill_tree().await?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_output_captures_stdout() {
        let runner = ProcessRunner::new("sh");
        let out = runner
            .output(&args(&["-c", "echo NAME; echo web-1"]))
            .await
            .unwrap();
        assert_eq!(out, "NAME\nweb-1\n");
    }

    #[tokio::test]
    async fn test_base_args_are_prepended() {
        let runner = ProcessRunner::with_args("sh", args(&["-c"]));
        let out = runner.output(&args(&["printf current"])).await.unwrap();
        assert_eq!(out, "current");
    }

    #[tokio::test]
    async fn test_output_non_zero_exit_is_error() {
        let runner = ProcessRunner::new("sh");
        let err = runner
            .output(&args(&["-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap_err();
        match err {
            KubectlError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let runner = ProcessRunner::new("/nonexistent/kubectl");
        assert!(matches!(
            runner.output(&[]).await,
            Err(KubectlError::KubectlNotFound)
        ));
        assert!(matches!(
            runner.spawn(&[]),
            Err(KubectlError::KubectlNotFound)
        ));
    }

    #[tokio::test]
    async fn test_wait_returns_exit_code() {
        let runner = ProcessRunner::new("sh");
        let mut tunnel = runner.spawn(&args(&["-c", "exit 7"])).unwrap();
        assert!(tunnel.id().is_some());
        assert_eq!(tunnel.wait_exit().await.unwrap(), Some(7));
    }

    /// True once `pid` is gone or a zombie nobody has reaped yet.
    #[cfg(target_os = "linux")]
    fn is_dead(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Err(_) => true,
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .map(|rest| rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_kill_tree_terminates_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("child.pid");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

        let runner = ProcessRunner::new("sh");
        let mut tunnel = runner.spawn(&args(&["-c", &script])).unwrap();
        let leader = tunnel.id().unwrap();

        let started = Instant::now();
        let child_pid = loop {
            if let Ok(content) = std::fs::read_to_string(&pid_file) {
                if let Ok(pid) = content.trim().parse::<u32>() {
                    break pid;
                }
            }
            assert!(started.elapsed() < Duration::from_secs(5), "child never started");
            tokio::time::sleep(Duration::from_millis(20)).await;
        };
        assert!(!is_dead(child_pid));

        tunnel.kill_tree().await.unwrap();

        assert!(is_dead(leader));
        let deadline = Instant::now() + Duration::from_secs(2);
        while !is_dead(child_pid) {
            assert!(Instant::now() < deadline, "descendant survived kill_tree");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_kill_tree_after_leader_exit_terminates_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("child.pid");
        let script = format!("sleep 30 & echo $! > {}; exit 1", pid_file.display());

        let runner = ProcessRunner::new("sh");
        let mut tunnel = runner.spawn(&args(&["-c", &script])).unwrap();
        assert_eq!(tunnel.wait_exit().await.unwrap(), Some(1));

        let child_pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(!is_dead(child_pid));

        tunnel.kill_tree().await.unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !is_dead(child_pid) {
            assert!(Instant::now() < deadline, "descendant outlived its exited leader");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test]
    async fn test_kill_tree_after_exit_is_ok() {
        let runner = ProcessRunner::new("sh");
        let mut tunnel = runner.spawn(&args(&["-c", "exit 0"])).unwrap();
        tunnel.wait_exit().await.unwrap();
        assert!(tunnel.kill_tree().await.is_ok());
    }
}

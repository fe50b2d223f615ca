//! Connector process supervision.
//!
//! Responsibilities:
//! - Spawn the connector with `--config <path>` and optional
//!   `--feature-gates=<flag>`, record its PID, and wait out a warm-up.
//! - Stop it with SIGTERM, wait a bounded grace period, then force-kill.
//!
//! Does NOT handle:
//! - Restarting a failed connector. Spawn and signal failures are fatal.
//! - Capturing connector output. stdout/stderr are inherited.
//!
//! Invariants:
//! - State only moves forward: Starting -> Running -> Stopping -> Stopped | Killed.
//! - A stop request always passes through Stopping.
//! - A `SupervisedProcess` dropped before reaching a terminal state kills
//!   its process, so no scenario leaks a running connector.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use harness_config::ConnectorConfig;
use harness_config::constants::{DEFAULT_GRACE_PERIOD_SECS, DEFAULT_WARMUP_SECS};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{HarnessError, Result};

/// Lifecycle state of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Killed,
}

impl ProcessState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Killed)
    }

    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Starting, Self::Running)
                | (Self::Starting, Self::Stopped)
                | (Self::Running, Self::Stopping)
                | (Self::Stopping, Self::Stopped)
                | (Self::Stopping, Self::Killed)
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Killed => "Killed",
        };
        f.write_str(name)
    }
}

/// How a stopped process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Exited with status 0 within the grace period.
    Stopped,
    /// Ignored SIGTERM for the whole grace period and was killed.
    Killed,
}

impl fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::Killed => f.write_str("killed"),
        }
    }
}

/// Starts connector processes.
#[derive(Debug, Clone)]
pub struct ConnectorSupervisor {
    binary: PathBuf,
    launcher: Vec<OsString>,
    warmup: Duration,
    grace_period: Duration,
}

impl ConnectorSupervisor {
    /// Supervisor for `binary` with the default warm-up and grace period.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            launcher: Vec::new(),
            warmup: Duration::from_secs(DEFAULT_WARMUP_SECS),
            grace_period: Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS),
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self::new(&config.binary)
            .with_warmup(config.warmup)
            .with_grace_period(config.grace_period)
    }

    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Run the binary through a launcher, e.g. `["sh", "-c", script]`.
    ///
    /// The launcher program is executed with its own arguments followed by
    /// the binary path and the connector arguments.
    pub fn with_launcher<I, S>(mut self, launcher: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.launcher = launcher.into_iter().map(Into::into).collect();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn warmup(&self) -> Duration {
        self.warmup
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Arguments passed to the connector binary.
    pub fn connector_args(config_path: &Path, feature_gates: Option<&str>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--config".into(), config_path.into()];
        if let Some(gates) = feature_gates.filter(|g| !g.is_empty()) {
            args.push(format!("--feature-gates={gates}").into());
        }
        args
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut cmd = match self.launcher.split_first() {
            Some((program, launcher_args)) => {
                let mut cmd = Command::new(program);
                cmd.args(launcher_args).arg(&self.binary);
                cmd
            }
            None => Command::new(&self.binary),
        };
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false);
        cmd
    }

    /// Spawn the connector and wait out the warm-up.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::Spawn`] if the OS cannot create the process.
    /// - [`HarnessError::EarlyExit`] if it exits before the warm-up ends.
    pub async fn start(
        &self,
        config_path: &Path,
        feature_gates: Option<&str>,
    ) -> Result<SupervisedProcess> {
        let args = Self::connector_args(config_path, feature_gates);
        let child = self
            .command(&args)
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let pid = child.id().ok_or_else(|| HarnessError::Spawn {
            binary: self.binary.clone(),
            source: std::io::Error::other("process exited before its PID was read"),
        })?;

        let mut process = SupervisedProcess {
            child,
            pid,
            args,
            state: ProcessState::Starting,
            grace_period: self.grace_period,
        };
        info!(
            pid,
            binary = %self.binary.display(),
            config = %config_path.display(),
            warmup_ms = self.warmup.as_millis() as u64,
            "Connector spawned"
        );

        tokio::time::sleep(self.warmup).await;

        let exited = process
            .child
            .try_wait()
            .map_err(|source| HarnessError::Signal {
                pid,
                action: "poll",
                source,
            })?;
        if let Some(status) = exited {
            process.transition(ProcessState::Stopped);
            return Err(HarnessError::EarlyExit { pid, status });
        }

        process.transition(ProcessState::Running);
        Ok(process)
    }
}

/// A running connector owned by one scenario.
#[derive(Debug)]
pub struct SupervisedProcess {
    child: Child,
    pid: u32,
    args: Vec<OsString>,
    state: ProcessState,
    grace_period: Duration,
}

impl SupervisedProcess {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Arguments the connector binary was started with.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn transition(&mut self, next: ProcessState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(pid = self.pid, from = %self.state, to = %next, "Process state change");
        self.state = next;
    }

    /// Stop the process: SIGTERM, bounded wait, then SIGKILL.
    ///
    /// Returns [`ShutdownOutcome::Killed`] rather than an error when the
    /// grace period runs out; a forced kill still leaves the environment
    /// usable.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::InvalidTransition`] unless the process is `Running`.
    /// - [`HarnessError::Signal`] if the process cannot be signalled or reaped.
    /// - [`HarnessError::UncleanExit`] if it exits in time with a non-zero status.
    pub async fn stop(&mut self) -> Result<ShutdownOutcome> {
        if self.state != ProcessState::Running {
            return Err(HarnessError::InvalidTransition {
                action: "stop",
                state: self.state,
            });
        }
        self.transition(ProcessState::Stopping);
        let pid = self.pid;

        // Already exited on its own: nothing to signal.
        let exited = self
            .child
            .try_wait()
            .map_err(|source| HarnessError::Signal {
                pid,
                action: "poll",
                source,
            })?;
        if let Some(status) = exited {
            return self.finish_exited(status);
        }

        let signalled = send_terminate(pid).map_err(|source| HarnessError::Signal {
            pid,
            action: "terminate",
            source,
        })?;

        if signalled {
            debug!(pid, grace_ms = self.grace_period.as_millis() as u64, "Sent SIGTERM");
            match tokio::time::timeout(self.grace_period, self.child.wait()).await {
                Ok(Ok(status)) => return self.finish_exited(status),
                Ok(Err(source)) => {
                    return Err(HarnessError::Signal {
                        pid,
                        action: "wait for",
                        source,
                    });
                }
                Err(_) => {
                    warn!(
                        pid,
                        grace_ms = self.grace_period.as_millis() as u64,
                        "Connector ignored SIGTERM, killing"
                    );
                }
            }
        }

        self.child
            .kill()
            .await
            .map_err(|source| HarnessError::Signal {
                pid,
                action: "kill",
                source,
            })?;
        self.transition(ProcessState::Killed);
        Ok(ShutdownOutcome::Killed)
    }

    fn finish_exited(&mut self, status: ExitStatus) -> Result<ShutdownOutcome> {
        self.transition(ProcessState::Stopped);
        if status.success() {
            info!(pid = self.pid, "Connector exited gracefully");
            Ok(ShutdownOutcome::Stopped)
        } else {
            Err(HarnessError::UncleanExit {
                pid: self.pid,
                status,
            })
        }
    }
}

impl Drop for SupervisedProcess {
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        warn!(pid = self.pid, state = %self.state, "Connector released without stop, killing");
        if let Err(e) = self.child.start_kill() {
            debug!(pid = self.pid, error = %e, "Kill on release failed");
        }
    }
}

/// Send SIGTERM. Returns `false` where graceful termination is unavailable.
#[cfg(unix)]
fn send_terminate(pid: u32) -> std::io::Result<bool> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "PID out of range"))?;
    // SAFETY: kill(2) has no memory-safety preconditions. The PID belongs to
    // our unreaped child, so it cannot have been recycled.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(true)
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_terminate(_pid: u32) -> std::io::Result<bool> {
    Ok(false)
}

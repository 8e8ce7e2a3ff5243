//! External tool execution.
//!
//! Tools are always spawned from an argument vector, never through a shell
//! string, so user-supplied values (commit messages, SQL, paths) need no
//! quoting.

use crate::error::{OpsError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a child with a deadline is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A fully described invocation of an external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,

    /// Arguments, passed through verbatim.
    pub args: Vec<String>,

    /// Extra environment variables (merged with the inherited env).
    pub env: HashMap<String, String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Kill the tool if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl Invocation {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run the tool inside `dir`.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Bound the run time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Human-readable command line, used in logs and error messages.
    ///
    /// Environment values are deliberately left out so credentials passed
    /// through the environment never reach the audit log.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                parts.push(format!("'{}'", arg.replace('\'', "'\\''")));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

/// Captured result of running an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the tool exited 0.
    pub success: bool,
}

impl CommandOutput {
    /// Create a success result.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
            duration: Duration::ZERO,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
            success: false,
        }
    }

    /// The tool's own diagnostic: stderr when present, otherwise stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }

    /// Convert a non-zero exit into [`OpsError::CommandFailed`].
    pub fn into_result(self, invocation: &Invocation) -> Result<CommandOutput> {
        if self.success {
            Ok(self)
        } else {
            Err(OpsError::CommandFailed {
                command: invocation.display(),
                code: self.exit_code,
                stderr: self.diagnostic().to_string(),
            })
        }
    }
}

/// Something that can run an [`Invocation`].
///
/// Commands receive a runner instead of spawning processes directly so
/// tests can record the invocations a handler builds without the real
/// tools installed.
pub trait ToolRunner: Send + Sync {
    /// Run the invocation to completion and capture its output.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        execute(invocation)
    }
}

/// Execute an invocation, capturing stdout and stderr.
pub fn execute(invocation: &Invocation) -> Result<CommandOutput> {
    let start = Instant::now();

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);

    if let Some(cwd) = &invocation.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &invocation.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Executing: {}", invocation.display());

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OpsError::ToolNotFound {
                tool: invocation.program.clone(),
            }
        } else {
            OpsError::Io(e)
        }
    })?;

    // Drain both pipes on their own threads so a chatty tool cannot
    // deadlock on a full pipe while we wait for it.
    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let status = match invocation.timeout {
        Some(limit) => wait_with_deadline(&mut child, limit, invocation)?,
        None => child.wait()?,
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    let duration = start.elapsed();

    tracing::debug!(
        "Finished in {:?} with status {:?}: {}",
        duration,
        status.code(),
        invocation.display()
    );

    Ok(CommandOutput {
        exit_code: status.code(),
        stdout,
        stderr,
        duration,
        success: status.success(),
    })
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).to_string()
    })
}

fn wait_with_deadline(
    child: &mut Child,
    limit: Duration,
    invocation: &Invocation,
) -> Result<std::process::ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(OpsError::Timeout {
                command: invocation.display(),
                seconds: whole_seconds(limit),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// `limit` rounded up, so sub-second budgets never read as 0s.
fn whole_seconds(limit: Duration) -> u64 {
    limit.as_secs() + u64::from(limit.subsec_nanos() > 0)
}

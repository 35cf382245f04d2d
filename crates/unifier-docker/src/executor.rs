use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::docker::DockerError;

/// One external command: program, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// First argument, e.g. `build`, `tag` or `push`.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Abstraction over container tool execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Whether `program` resolves to an executable. Names containing a path
    /// separator are checked directly, bare names are looked up in `PATH`.
    fn is_available(&self, program: &str) -> bool;

    /// Run a command to completion with inherited stdio.
    async fn run(&self, invocation: &Invocation) -> Result<(), DockerError>;
}

/// Real subprocess executor.
#[derive(Debug, Clone, Default)]
pub struct RealExecutor {
    timeout: Option<Duration>,
}

impl RealExecutor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl DockerExecutor for RealExecutor {
    fn is_available(&self, program: &str) -> bool {
        match which::which(program) {
            Ok(path) => {
                tracing::debug!(program, path = %path.display(), "tool resolved");
                true
            }
            Err(e) => {
                tracing::debug!(program, error = %e, "tool lookup failed");
                false
            }
        }
    }

    async fn run(&self, invocation: &Invocation) -> Result<(), DockerError> {
        use std::process::Stdio;

        let command = invocation.to_string();
        let io_err = |e: std::io::Error| DockerError::Io {
            command: command.clone(),
            source: e,
        };

        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(io_err)?;

        let status = match self.timeout {
            None => child.wait().await.map_err(io_err)?,
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(status) => status.map_err(io_err)?,
                    Err(_elapsed) => {
                        // arch-lint: allow(no-error-swallowing) reason="the timeout is reported either way; a failed kill is only worth a warning"
                        if let Err(e) = child.kill().await {
                            tracing::warn!(command = %command, error = %e, "failed to kill timed-out command");
                        }
                        return Err(DockerError::TimedOut {
                            command,
                            timeout: limit,
                        });
                    }
                }
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                command,
                code: status.code(),
            })
        }
    }
}

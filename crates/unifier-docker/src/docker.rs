use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("required tool not found in PATH: {tool}")]
    ToolNotFound { tool: String },

    #[error("command failed ({}): {command}", format_code(*code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to run {command}")]
    Io {
        command: String,
        source: std::io::Error,
    },

    #[error("command timed out after {}s: {command}", timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },
}

impl DockerError {
    /// Exit code of a failed command, when the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn format_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit={code}"),
        None => "terminated by signal".to_owned(),
    }
}

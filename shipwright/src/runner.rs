use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One external command, always bound to an explicit working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Capture stdout/stderr instead of inheriting the terminal. Interactive
    /// tools (`docker login`, `git push` over ssh) must not be captured.
    pub capture: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            capture: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Result of running an [`Invocation`]. Output is empty for uncaptured runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Exit code; `None` when the process could not be spawned or was killed
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutcome {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn exited(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn not_started(reason: impl Into<String>) -> Self {
        Self {
            code: None,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Short human-readable reason for a failed outcome
    pub fn describe(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.code, stderr.is_empty()) {
            (Some(0), _) => "ok".to_string(),
            (Some(code), true) => format!("exit status {code}"),
            (Some(code), false) => format!("exit status {code}: {stderr}"),
            (None, true) => "terminated".to_string(),
            (None, false) => stderr.to_string(),
        }
    }
}

/// Seam between the release steps and the processes they start
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> StepOutcome;
}

/// Runs invocations as real child processes, blocking until each exits
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> StepOutcome {
        tracing::debug!("Running `{}` in {}", invocation, invocation.cwd.display());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);

        if invocation.capture {
            match cmd.output() {
                Ok(output) => StepOutcome {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                },
                Err(e) => StepOutcome::not_started(format!(
                    "failed to execute {}: {e}",
                    invocation.program
                )),
            }
        } else {
            match cmd.status() {
                Ok(status) => StepOutcome {
                    code: status.code(),
                    ..Default::default()
                },
                Err(e) => StepOutcome::not_started(format!(
                    "failed to execute {}: {e}",
                    invocation.program
                )),
            }
        }
    }
}

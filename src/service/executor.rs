use crate::common::error::ServiceError;
use crate::common::platform::Platform;
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;

pub const PWSH7_PATH: &str = r"C:\Program Files\PowerShell\7\pwsh.exe";
pub const LEGACY_POWERSHELL: &str = "powershell.exe";

/// Whether a script needs administrator/root rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    User,
    Admin,
}

/// Prefer PowerShell 7 when installed, otherwise the inbox Windows PowerShell
pub fn detect_windows_shell(exists: impl Fn(&Path) -> bool) -> String {
    if exists(Path::new(PWSH7_PATH)) {
        PWSH7_PATH.to_string()
    } else {
        LEGACY_POWERSHELL.to_string()
    }
}

enum Program {
    /// The detected PowerShell interpreter
    Shell,
    Fixed(&'static str),
}

enum ArgTemplate {
    Lit(&'static str),
    Script,
    ScriptArgs,
    /// `Start-Process <shell> -Verb RunAs ...` re-launching the script elevated
    RunAs,
}

struct CommandTemplate {
    platform: Platform,
    elevation: Elevation,
    program: Program,
    args: &'static [ArgTemplate],
}

use ArgTemplate::{Lit, RunAs, Script, ScriptArgs};

// osascript hands trailing arguments to the run handler, which shell-quotes
// each one, so nothing the caller passes is ever parsed by AppleScript or sh.
const MACOS_ELEVATED_ARGS: &[ArgTemplate] = &[
    Lit("-e"),
    Lit("on run argv"),
    Lit("-e"),
    Lit("set cmd to \"/bin/bash\""),
    Lit("-e"),
    Lit("repeat with arg in argv"),
    Lit("-e"),
    Lit("set cmd to cmd & \" \" & quoted form of (arg as text)"),
    Lit("-e"),
    Lit("end repeat"),
    Lit("-e"),
    Lit("return do shell script cmd with administrator privileges"),
    Lit("-e"),
    Lit("end run"),
    Script,
    ScriptArgs,
];

const COMMAND_TABLE: &[CommandTemplate] = &[
    CommandTemplate {
        platform: Platform::Windows,
        elevation: Elevation::User,
        program: Program::Shell,
        args: &[
            Lit("-NoLogo"),
            Lit("-NoProfile"),
            Lit("-ExecutionPolicy"),
            Lit("Bypass"),
            Lit("-File"),
            Script,
            ScriptArgs,
        ],
    },
    CommandTemplate {
        platform: Platform::Windows,
        elevation: Elevation::Admin,
        program: Program::Shell,
        args: &[Lit("-NoProfile"), Lit("-Command"), RunAs],
    },
    CommandTemplate {
        platform: Platform::Linux,
        elevation: Elevation::User,
        program: Program::Fixed("bash"),
        args: &[Script, ScriptArgs],
    },
    CommandTemplate {
        platform: Platform::Linux,
        elevation: Elevation::Admin,
        program: Program::Fixed("pkexec"),
        args: &[Lit("bash"), Script, ScriptArgs],
    },
    CommandTemplate {
        platform: Platform::MacOs,
        elevation: Elevation::User,
        program: Program::Fixed("bash"),
        args: &[Script, ScriptArgs],
    },
    CommandTemplate {
        platform: Platform::MacOs,
        elevation: Elevation::Admin,
        program: Program::Fixed("osascript"),
        args: MACOS_ELEVATED_ARGS,
    },
];

/// PowerShell single-quoted literal
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Start-Process joins -ArgumentList with spaces, so values containing
/// whitespace need their own double quotes to survive as one argument.
fn start_process_arg(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        ps_quote(&format!("\"{}\"", value))
    } else {
        ps_quote(value)
    }
}

fn run_as_command(shell: &str, script: &str, args: &[String]) -> String {
    let argument_list = ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
        .iter()
        .map(|flag| ps_quote(flag))
        .chain(std::iter::once(start_process_arg(script)))
        .chain(args.iter().map(|a| start_process_arg(a)))
        .collect::<Vec<_>>()
        .join(",");

    // Start-Process returns normally whatever the elevated child does, so
    // its exit code has to be forwarded as ours.
    format!(
        "$p = Start-Process {} -Verb RunAs -Wait -PassThru -ArgumentList {}; exit $p.ExitCode",
        ps_quote(shell),
        argument_list
    )
}

/// One external command, fully resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Command line that runs `script` with `args` on `platform`.
    /// `windows_shell` is only consulted on Windows.
    pub fn for_script(
        platform: Platform,
        elevation: Elevation,
        windows_shell: &str,
        script: &Path,
        args: &[String],
    ) -> Self {
        let script = script.to_string_lossy().into_owned();
        let template = COMMAND_TABLE
            .iter()
            .find(|t| t.platform == platform && t.elevation == elevation)
            .expect("command table covers every platform and elevation");

        let program = match template.program {
            Program::Shell => windows_shell.to_string(),
            Program::Fixed(p) => p.to_string(),
        };

        let mut out = Vec::new();
        for arg in template.args {
            match arg {
                Lit(s) => out.push((*s).to_string()),
                Script => out.push(script.clone()),
                ScriptArgs => out.extend(args.iter().cloned()),
                RunAs => out.push(run_as_command(windows_shell, &script, args)),
            }
        }

        Self { program, args: out }
    }
}

/// Captured outcome of one process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl ExecutionResult {
    pub fn from_output(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            success: output.status.success(),
        }
    }

    /// stdout on success, otherwise stderr (or a generic message when stderr is empty)
    pub fn into_output(self) -> Result<String, ServiceError> {
        if self.success {
            return Ok(self.stdout);
        }

        let message = if !self.stderr.trim().is_empty() {
            self.stderr
        } else {
            match self.exit_code {
                Some(code) => format!("Command failed with exit code {}", code),
                None => "Command terminated by signal".to_string(),
            }
        };
        Err(ServiceError::ScriptFailed { message })
    }
}

/// Runs a [`CommandSpec`] to completion
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> BoxFuture<'a, Result<ExecutionResult, ServiceError>>;
}

/// Spawns a real child process per call. No timeout: an elevation prompt
/// may stay open for as long as the user leaves it.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> BoxFuture<'a, Result<ExecutionResult, ServiceError>> {
        async move {
            let mut cmd = tokio::process::Command::new(&spec.program);
            cmd.args(&spec.args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());

            #[cfg(target_os = "windows")]
            {
                const CREATE_NO_WINDOW: u32 = 0x08000000;
                cmd.creation_flags(CREATE_NO_WINDOW);
            }

            log::debug!("Spawning {} {:?}", spec.program, spec.args);
            let output = cmd.output().await.map_err(|source| ServiceError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

            Ok(ExecutionResult::from_output(output))
        }
        .boxed()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every command and answers with a canned result
    pub struct RecordingRunner {
        pub calls: Mutex<Vec<CommandSpec>>,
        pub reply: ExecutionResult,
    }

    impl RecordingRunner {
        pub fn succeeding(stdout: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: ExecutionResult {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                    success: true,
                },
            }
        }

        pub fn failing(stderr: &str, code: i32) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: ExecutionResult {
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                    exit_code: Some(code),
                    success: false,
                },
            }
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run<'a>(
            &'a self,
            spec: &'a CommandSpec,
        ) -> BoxFuture<'a, Result<ExecutionResult, ServiceError>> {
            self.calls.lock().unwrap().push(spec.clone());
            let reply = self.reply.clone();
            async move { Ok(reply) }.boxed()
        }
    }
}

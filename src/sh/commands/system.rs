// External programs
use crate::sh::context::ShellContext;
use crate::sh::error::ExecError;
use crate::sh::streams::Streams;
use log::debug;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};

pub struct SystemCommand {
    pub path: PathBuf,
}

impl SystemCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Starts the program with `args` (argv[0] kept as typed), the shell's
    /// directory, a snapshot of its variables and `io` as standard streams.
    pub fn spawn(&self, args: &[String], ctx: &ShellContext, io: &Streams) -> Result<Child, ExecError> {
        let program = &args[0];
        let (stdin, stdout, stderr) = io.try_clone()?.into_stdio();

        let mut cmd = Command::new(&self.path);
        cmd.arg0(program);
        cmd.args(&args[1..]);
        cmd.current_dir(&ctx.cwd);

        // The shell's variables are the whole environment of the child
        cmd.env_clear();
        cmd.envs(&ctx.env);

        cmd.stdin(stdin).stdout(stdout).stderr(stderr);

        let child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;
        debug!("spawned {} as pid {}", self.path.display(), child.id());
        Ok(child)
    }
}

pub fn wait_child(mut child: Child, program: &str) -> Result<i32, ExecError> {
    let status = child.wait().map_err(|source| ExecError::Wait {
        program: program.to_string(),
        source,
    })?;
    let code = exit_code(status);
    debug!("pid {} ({}) exited with {}", child.id(), program, code);
    Ok(code)
}

/// Exit code, or 128 + signal number for a process killed by a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

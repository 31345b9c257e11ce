use crate::sh::commands::Executable;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;

pub struct PwdCommand;

impl Executable for PwdCommand {
    fn execute(&self, _args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        writeln!(io.stdout, "{}", ctx.cwd.display())?;
        Ok(0)
    }
}

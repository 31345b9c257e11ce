use crate::sh::commands::Executable;
use crate::sh::commands::builtins::common::sorted_vars;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;

pub struct EnvCommand;

impl Executable for EnvCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        if args.len() > 1 {
            return Err(BuiltinError::Usage("options and arguments are not supported".to_string()));
        }
        for (key, value) in sorted_vars(ctx) {
            writeln!(io.stdout, "{}={}", key, value)?;
        }
        Ok(0)
    }
}

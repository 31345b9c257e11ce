use crate::sh::commands::Executable;
use crate::sh::commands::builtins::common::check_identifier;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;

pub struct UnsetCommand;

impl Executable for UnsetCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        let mut status = 0;
        for name in &args[1..] {
            if check_identifier("unset", name, io)? {
                ctx.env.remove(name);
            } else {
                status = 1;
            }
        }
        Ok(status)
    }
}

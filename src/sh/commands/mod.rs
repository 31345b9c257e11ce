pub mod builtins;
pub mod system;

use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;

/// A command that runs inside the shell process.
pub trait Executable: Send + Sync {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError>;
}

/// Runs `args[0]` as a built-in. `None` means it is not one and the caller
/// should look for an external program instead.
pub fn dispatch(args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Option<i32> {
    let name = args.first()?;
    let registry = ctx.registry.clone();
    let command = registry.get(name)?;

    let status = match command.execute(args, ctx, io) {
        Ok(status) => status,
        Err(e) => {
            writeln!(io.stderr, "{}: {}", name, e).ok();
            1
        }
    };
    io.stdout.flush().ok();
    Some(status)
}

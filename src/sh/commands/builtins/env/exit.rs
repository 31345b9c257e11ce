// Exit command

use crate::sh::commands::Executable;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;

/// Asks the shell (or the enclosing subshell) to stop. The read loop looks at
/// `ctx.exit_request`; the process itself is never terminated from here.
pub struct ExitCommand;

impl Executable for ExitCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        let code = match args.get(1) {
            None => ctx.exit_code,
            Some(arg) => match arg.trim().parse::<i64>() {
                Ok(_) if args.len() > 2 => {
                    return Err(BuiltinError::Usage("too many arguments".to_string()));
                }
                Ok(n) => (n & 0xff) as i32,
                Err(_) => {
                    writeln!(io.stderr, "exit: {}: numeric argument required", arg)?;
                    255
                }
            },
        };

        ctx.exit_request = Some(code);
        Ok(code)
    }
}

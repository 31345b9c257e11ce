use crate::sh::commands::Executable;
use crate::sh::commands::builtins::common::{check_identifier, sorted_vars};
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;

pub struct ExportCommand;

impl Executable for ExportCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        // args[0] is "export"
        if args.len() == 1 {
            for (key, value) in sorted_vars(ctx) {
                writeln!(io.stdout, "declare -x {}={}", key, shell_words::quote(value))?;
            }
            return Ok(0);
        }

        let mut status = 0;
        for arg in &args[1..] {
            let (key, value) = match arg.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (arg.as_str(), None),
            };
            if !check_identifier("export", key, io)? {
                status = 1;
                continue;
            }
            // `export NAME` only exports what is already set
            if let Some(value) = value {
                ctx.env.insert(key.to_string(), value.to_string());
            }
        }
        Ok(status)
    }
}

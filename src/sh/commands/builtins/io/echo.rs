// Echo command

use crate::sh::commands::Executable;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;

pub struct EchoCommand;

impl Executable for EchoCommand {
    fn execute(&self, args: &[String], _ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        // Skip "echo" in args[0]; any leading run of -n, -nn, ... drops the newline
        let mut words = &args[1..];
        let mut newline = true;
        while let Some(first) = words.first() {
            if !is_no_newline_flag(first) {
                break;
            }
            newline = false;
            words = &words[1..];
        }

        let output = words.join(" ");
        if newline {
            writeln!(io.stdout, "{}", output)?;
        } else {
            write!(io.stdout, "{}", output)?;
        }
        Ok(0)
    }
}

fn is_no_newline_flag(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'n')
}

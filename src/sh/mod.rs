pub mod ast;
pub mod commands;
pub mod context;
pub mod error;
pub mod executor;
pub mod expand;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod streams;

use context::ShellContext;
use error::ShellError;
use executor::{execute, read_heredocs};
use streams::Streams;

#[cfg(test)]
mod testutil;


/// Parses and runs one line against the process's own standard streams.
pub fn run_command_line(line: &str, ctx: &mut ShellContext) -> Result<i32, ShellError> {
    run_command_line_with(line, ctx, &Streams::inherit())
}

pub fn run_command_line_with(line: &str, ctx: &mut ShellContext, io: &Streams) -> Result<i32, ShellError> {
    let mut node = parser::parse_command_line(line)?;
    read_heredocs(&mut node, ctx)?;
    Ok(execute(&node, ctx, io)?)
}

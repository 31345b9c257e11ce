use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::lexer::is_identifier;
use crate::sh::streams::Streams;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn resolve_path(ctx: &ShellContext, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        ctx.cwd.join(p)
    }
}

/// Reports a bad variable name on stderr; the caller keeps going with the
/// remaining arguments and fails at the end.
pub fn check_identifier(command: &str, name: &str, io: &mut Streams) -> Result<bool, BuiltinError> {
    if is_identifier(name) {
        return Ok(true);
    }
    writeln!(io.stderr, "{}: {}", command, BuiltinError::InvalidIdentifier(name.to_string()))?;
    Ok(false)
}

/// Variables sorted by name, for stable listings.
pub fn sorted_vars(ctx: &ShellContext) -> Vec<(&String, &String)> {
    let mut vars: Vec<_> = ctx.env.iter().collect();
    vars.sort();
    vars
}

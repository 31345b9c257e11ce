// Cd command

use crate::sh::commands::Executable;
use crate::sh::commands::builtins::common::resolve_path;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::Streams;
use std::io::Write;
use std::mem;

pub struct CdCommand;

impl Executable for CdCommand {
    fn execute(&self, args: &[String], ctx: &mut ShellContext, io: &mut Streams) -> Result<i32, BuiltinError> {
        if args.len() > 2 {
            return Err(BuiltinError::Usage("too many arguments".to_string()));
        }

        // args[0] is "cd". args[1] is path, or "-" for the previous directory.
        let (path_str, announce) = match args.get(1).map(String::as_str) {
            None => (lookup(ctx, "HOME")?, false),
            Some("-") => (lookup(ctx, "OLDPWD")?, true),
            Some(path) => (path.to_string(), false),
        };

        let new_path = resolve_path(ctx, &path_str);
        if !new_path.exists() {
            return Err(BuiltinError::NoSuchDirectory(path_str));
        }
        if !new_path.is_dir() {
            return Err(BuiltinError::Usage(format!("{}: Not a directory", path_str)));
        }

        // Canonicalize to remove .. and .
        let new_path = new_path.canonicalize().unwrap_or(new_path);
        let old_path = mem::replace(&mut ctx.cwd, new_path);
        ctx.env.insert("OLDPWD".to_string(), old_path.to_string_lossy().into_owned());
        ctx.env.insert("PWD".to_string(), ctx.cwd.to_string_lossy().into_owned());

        if announce {
            writeln!(io.stdout, "{}", ctx.cwd.display())?;
        }
        Ok(0)
    }
}

fn lookup(ctx: &ShellContext, name: &str) -> Result<String, BuiltinError> {
    match ctx.env.get(name) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(BuiltinError::Usage(format!("{} not set", name))),
    }
}

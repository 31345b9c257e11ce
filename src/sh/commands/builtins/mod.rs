pub mod env;
pub mod io;
pub mod common; // Private helpers

use crate::sh::context::ShellContext;

/// Helper to register all built-in commands at once
pub fn register_all_builtins(ctx: &mut ShellContext) {
    // Env/Navigation
    ctx.register_command("cd", Box::new(env::cd::CdCommand));
    ctx.register_command("pwd", Box::new(env::pwd::PwdCommand));
    ctx.register_command("export", Box::new(env::export::ExportCommand));
    ctx.register_command("unset", Box::new(env::unset::UnsetCommand));
    ctx.register_command("env", Box::new(env::printenv::EnvCommand));
    ctx.register_command("exit", Box::new(env::exit::ExitCommand));

    // IO
    ctx.register_command("echo", Box::new(io::echo::EchoCommand));
}

#[cfg(test)]
mod tests;

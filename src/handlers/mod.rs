pub mod oneshot;
pub mod repl;

use crate::cli::Cli;
use crate::config::{ShellConfig, default_config_path, initial_environment, load_config};
use crate::sh::context::ShellContext;
use crate::sh::error::{ExecError, ShellError};
use crate::sh::run_command_line;
use anyhow::{Context, Result, bail};
use std::env;

/// Status of a line that did not parse.
const SYNTAX_ERROR_STATUS: i32 = 2;

/// Loads the settings the flags point at and builds the starting shell state.
pub fn build_context(cli: &Cli) -> Result<(ShellContext, ShellConfig)> {
    let config = if cli.no_rc {
        ShellConfig::default()
    } else if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        load_config(path)?
    } else {
        match default_config_path() {
            Some(path) => load_config(&path)?,
            None => ShellConfig::default(),
        }
    };

    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let vars = initial_environment(&config, &cwd);
    Ok((ShellContext::with_environment(vars, cwd), config))
}

/// Runs one line and reports anything that kept it from running. Never
/// fails: a bad line only sets the status.
pub fn run_line(line: &str, ctx: &mut ShellContext) -> i32 {
    match run_command_line(line, ctx) {
        Ok(status) => status,
        Err(e) => {
            report_error(&e);
            let status = if e.is_syntax() { SYNTAX_ERROR_STATUS } else { 1 };
            ctx.exit_code = status;
            status
        }
    }
}

fn report_error(error: &ShellError) {
    if error.is_allocation() || matches!(error, ShellError::Exec(ExecError::Expansion(_))) {
        eprintln!("{}", error);
    } else {
        eprintln!("ebash: {}", error);
    }
}

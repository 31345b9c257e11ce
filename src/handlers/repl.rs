use crate::cli::Cli;
use crate::config::ShellConfig;
use crate::handlers::{build_context, run_line};
use crate::sh::context::ShellContext;
use anyhow::{Context, Result};
use colored::*;
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Status after Ctrl-C discards a line.
const INTERRUPTED_STATUS: i32 = 130;

pub fn handle_repl(cli: &Cli) -> Result<i32> {
    let (mut ctx, config) = build_context(cli)?;
    ctx.interactive = true;

    // SIGINT goes to the foreground children; the shell itself stays up
    if let Err(e) = ctrlc::set_handler(|| {}) {
        warn!("cannot install the Ctrl-C handler: {}", e);
    }

    let mut rl = DefaultEditor::new().context("Failed to start the line editor")?;
    let history = config.history_path(ctx.env.get("HOME").map(String::as_str));
    if let Some(path) = history.as_ref().filter(|p| p.exists()) {
        if let Err(e) = rl.load_history(path) {
            warn!("cannot load history from {}: {}", path.display(), e);
        }
    }

    let status = loop {
        match rl.readline(&prompt(&config, &ctx)) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    warn!("cannot record history: {}", e);
                }
                run_line(&line, &mut ctx);
                if let Some(code) = ctx.exit_request {
                    eprintln!("exit");
                    break code;
                }
            }
            Err(ReadlineError::Interrupted) => {
                ctx.exit_code = INTERRUPTED_STATUS;
            }
            Err(ReadlineError::Eof) => {
                eprintln!("exit");
                break ctx.exit_code;
            }
            Err(e) => return Err(e).context("Failed to read input"),
        }
    };

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            warn!("cannot save history to {}: {}", path.display(), e);
        }
    }
    debug!("shell exiting with {}", status);
    Ok(status)
}

/// `e-bash <folder> > `, where folder is the last component of the cwd.
fn prompt(config: &ShellConfig, ctx: &ShellContext) -> String {
    let folder = ctx
        .cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string());
    format!("{} {} > ", config.prompt.green().bold(), folder.cyan())
}

use crate::cli::Cli;
use crate::handlers::{build_context, run_line};
use anyhow::Result;
use log::debug;

/// `ebash -c LINE`: the process exits with the line's status, or with the
/// code passed to `exit`.
pub fn handle_oneshot(cli: &Cli, line: &str) -> Result<i32> {
    let (mut ctx, _config) = build_context(cli)?;
    let status = run_line(line, &mut ctx);
    debug!("one-shot line finished with {}", status);
    Ok(ctx.exit_request.unwrap_or(status))
}

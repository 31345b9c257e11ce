use crate::sh::ast::{Node, RedirectKind, Redirection, Word};
use crate::sh::commands::dispatch;
use crate::sh::commands::system::{SystemCommand, wait_child};
use crate::sh::context::ShellContext;
use crate::sh::error::{ExecError, io_reason};
use crate::sh::expand::{expand_argv, expand_text, expand_word};
use crate::sh::resolver::resolve;
use crate::sh::streams::{Sink, Source, Streams};
use log::{debug, error, warn};
use os_pipe::pipe;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::Child;
use std::thread::{self, Scope, ScopedJoinHandle};

/// A program that was found but could not be started.
const CANNOT_EXECUTE: i32 = 126;
const GENERAL_FAILURE: i32 = 1;

/// Runs `node` and returns its exit status. The tree is only read; all state
/// changes go through `ctx`.
pub fn execute(node: &Node, ctx: &mut ShellContext, io: &Streams) -> Result<i32, ExecError> {
    let status = match node {
        Node::Simple { argv, redirections } => execute_simple(argv, redirections, ctx, io)?,
        Node::Pipeline(stages) => execute_pipeline(stages, ctx, io)?,
        Node::And(left, right) => handle_sequence(left, right, ctx, io, SequenceMode::And)?,
        Node::Or(left, right) => handle_sequence(left, right, ctx, io, SequenceMode::Or)?,
        Node::Group { inner, redirections } => execute_group(inner, redirections, ctx, io)?,
    };
    ctx.exit_code = status;
    Ok(status)
}

fn execute_simple(
    argv: &[Word],
    redirections: &[Redirection],
    ctx: &mut ShellContext,
    io: &Streams,
) -> Result<i32, ExecError> {
    let args = expand_argv(argv, ctx)?;
    let mut io = io.try_clone()?;
    if !open_redirections(redirections, ctx, &mut io)? {
        return Ok(GENERAL_FAILURE);
    }

    let Some(program) = args.first() else {
        // Only redirections: files are opened (and created), nothing runs
        return Ok(0);
    };

    if let Some(status) = dispatch(&args, ctx, &mut io) {
        return Ok(status);
    }

    Ok(match launch_external(&args, ctx, &mut io)? {
        External::Child(child) => reap(child, program),
        External::Done(status) => status,
    })
}

enum External {
    Child(Child),
    Done(i32),
}

/// Resolves and starts `args[0]`. Resolution and spawn failures are reported
/// on the command's stderr and turned into a status; nothing is started then.
fn launch_external(args: &[String], ctx: &ShellContext, io: &mut Streams) -> Result<External, ExecError> {
    let program = &args[0];
    let path = match resolve(program, &ctx.search_paths(), &ctx.cwd) {
        Ok(path) => path,
        Err(e) => {
            writeln!(io.stderr, "{}: {}", program, e).ok();
            return Ok(External::Done(e.exit_status()));
        }
    };

    match SystemCommand::new(path).spawn(args, ctx, io) {
        Ok(child) => Ok(External::Child(child)),
        Err(e @ ExecError::Spawn { .. }) => {
            writeln!(io.stderr, "{}", e).ok();
            Ok(External::Done(CANNOT_EXECUTE))
        }
        Err(e) => Err(e),
    }
}

fn reap(child: Child, program: &str) -> i32 {
    wait_child(child, program).unwrap_or_else(|e| {
        error!("{}", e);
        GENERAL_FAILURE
    })
}

/// Applies `redirections` left to right onto `io`. A target that cannot be
/// opened is reported on stderr and yields `Ok(false)`.
fn open_redirections(
    redirections: &[Redirection],
    ctx: &ShellContext,
    io: &mut Streams,
) -> Result<bool, ExecError> {
    for redirection in redirections {
        if redirection.kind == RedirectKind::Heredoc {
            io.stdin = heredoc_source(redirection, ctx)?;
            continue;
        }

        let mut fields = expand_word(&redirection.target, ctx)?;
        let target = match fields.pop() {
            Some(target) if fields.is_empty() => target,
            _ => {
                writeln!(io.stderr, "{}: ambiguous redirect", redirection.target).ok();
                return Ok(false);
            }
        };

        let path = ctx.cwd.join(&target);
        let file = match open_target(redirection.kind, &path) {
            Ok(file) => file,
            Err(e) => {
                writeln!(io.stderr, "{}: {}", target, io_reason(&e)).ok();
                return Ok(false);
            }
        };
        debug!("redirect {} {}", redirection.kind.symbol(), path.display());

        match redirection.kind {
            RedirectKind::Input | RedirectKind::Heredoc => io.stdin = Source::File(file),
            RedirectKind::Output | RedirectKind::Append => io.stdout = Sink::File(file),
        }
    }
    Ok(true)
}

fn open_target(kind: RedirectKind, path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    match kind {
        RedirectKind::Input | RedirectKind::Heredoc => options.read(true),
        RedirectKind::Output => options.write(true).create(true).truncate(true),
        RedirectKind::Append => options.append(true).create(true),
    };
    options.open(path)
}

/// Reads every heredoc body in `node` from the heredoc input, in the order
/// the `<<` operators appear on the line. Runs once after parsing, before
/// anything executes, so skipped commands and pipeline stages still consume
/// exactly their own lines.
pub fn read_heredocs(node: &mut Node, ctx: &ShellContext) -> Result<(), ExecError> {
    match node {
        Node::Simple { redirections, .. } => read_bodies(redirections, ctx),
        Node::Pipeline(stages) => {
            for stage in stages {
                read_heredocs(stage, ctx)?;
            }
            Ok(())
        }
        Node::And(left, right) | Node::Or(left, right) => {
            read_heredocs(left, ctx)?;
            read_heredocs(right, ctx)
        }
        Node::Group { inner, redirections } => {
            read_heredocs(inner, ctx)?;
            read_bodies(redirections, ctx)
        }
    }
}

fn read_bodies(redirections: &mut [Redirection], ctx: &ShellContext) -> Result<(), ExecError> {
    for redirection in redirections.iter_mut() {
        if redirection.kind == RedirectKind::Heredoc {
            redirection.body = Some(read_body(&redirection.target, ctx)?);
        }
    }
    Ok(())
}

fn read_body(delimiter: &Word, ctx: &ShellContext) -> Result<String, ExecError> {
    let delimiter_text = delimiter.to_string();
    let mut body = String::new();
    loop {
        match ctx.read_heredoc_line().map_err(ExecError::Heredoc)? {
            Some(line) if line == delimiter_text => break,
            Some(line) => {
                body.push_str(&line);
                body.push('\n');
            }
            None => {
                warn!("here-document delimited by end-of-file (wanted `{}')", delimiter_text);
                break;
            }
        }
    }
    Ok(body)
}

/// Serves a heredoc body through a pipe. A quoted delimiter turns off
/// variable expansion in the body.
fn heredoc_source(redirection: &Redirection, ctx: &ShellContext) -> Result<Source, ExecError> {
    let raw = redirection.body.as_deref().unwrap_or_default();
    let body = if redirection.target.has_quotes() {
        raw.to_string()
    } else {
        let mut expanded = String::new();
        for line in raw.lines() {
            expanded.push_str(&expand_text(line, ctx));
            expanded.push('\n');
        }
        expanded
    };

    let (reader, mut writer) = pipe().map_err(ExecError::Pipe)?;
    // Fed from a thread so a body larger than the pipe buffer cannot block us
    thread::spawn(move || {
        writer.write_all(body.as_bytes()).ok();
    });
    Ok(Source::Pipe(reader))
}

fn execute_group(
    inner: &Node,
    redirections: &[Redirection],
    ctx: &mut ShellContext,
    io: &Streams,
) -> Result<i32, ExecError> {
    let mut io = io.try_clone()?;
    if !open_redirections(redirections, ctx, &mut io)? {
        return Ok(GENERAL_FAILURE);
    }
    // Subshell: cd, export and exit inside the group stay inside it
    let mut sub_ctx = ctx.clone_for_subshell();
    execute(inner, &mut sub_ctx, &io)
}

#[derive(PartialEq)]
enum SequenceMode {
    And,
    Or,
}

fn handle_sequence(
    left: &Node,
    right: &Node,
    ctx: &mut ShellContext,
    io: &Streams,
    mode: SequenceMode,
) -> Result<i32, ExecError> {
    let left_res = execute(left, ctx, io)?;
    if ctx.exit_request.is_some() {
        return Ok(left_res);
    }

    let proceed = match mode {
        SequenceMode::And => left_res == 0,
        SequenceMode::Or => left_res != 0,
    };
    if proceed {
        execute(right, ctx, io)
    } else {
        Ok(left_res)
    }
}

enum Stage<'scope> {
    Child(Child, String),
    Thread(ScopedJoinHandle<'scope, Result<i32, ExecError>>),
    Done(i32),
}

/// Starts every stage before waiting on any of them, then reaps them all.
/// The pipeline's status is the last stage's.
fn execute_pipeline(stages: &[Node], ctx: &ShellContext, io: &Streams) -> Result<i32, ExecError> {
    thread::scope(|scope| -> Result<i32, ExecError> {
        let mut running = Vec::new();
        running.try_reserve(stages.len())?;
        let mut next_stdin = Some(io.stdin.try_clone()?);
        let mut launch_error = None;

        for (i, stage) in stages.iter().enumerate() {
            let last = i + 1 == stages.len();
            let launched = connect_stage(io, &mut next_stdin, last)
                .and_then(|stage_io| launch_stage(scope, stage, ctx, stage_io));
            match launched {
                Ok(launched) => running.push(launched),
                Err(e) => {
                    launch_error = Some(e);
                    break;
                }
            }
        }
        // Stages already running must not wait on a reader we still hold
        drop(next_stdin);

        let mut status = 0;
        let mut stage_error = None;
        for stage in running {
            match finish_stage(stage) {
                Ok(code) => status = code,
                Err(e) => {
                    stage_error.get_or_insert(e);
                }
            }
        }
        debug!("pipeline of {} stages finished with {}", stages.len(), status);

        match launch_error.or(stage_error) {
            Some(e) => Err(e),
            None => Ok(status),
        }
    })
}

/// Streams for the next stage: the previous pipe's read end (or the
/// pipeline's stdin) and a fresh pipe (or the pipeline's stdout when last).
fn connect_stage(io: &Streams, next_stdin: &mut Option<Source>, last: bool) -> Result<Streams, ExecError> {
    let stdin = next_stdin.take().unwrap_or(Source::Null);
    let stdout = if last {
        io.stdout.try_clone()?
    } else {
        let (reader, writer) = pipe().map_err(ExecError::Pipe)?;
        *next_stdin = Some(Source::Pipe(reader));
        Sink::Pipe(writer)
    };
    Ok(Streams {
        stdin,
        stdout,
        stderr: io.stderr.try_clone()?,
    })
}

// Each stage owns its pipe ends and drops them once started or finished, so
// EOF reaches the next stage.
fn launch_stage<'scope>(
    scope: &'scope Scope<'scope, '_>,
    stage: &'scope Node,
    ctx: &ShellContext,
    mut io: Streams,
) -> Result<Stage<'scope>, ExecError> {
    if let Node::Simple { argv, redirections } = stage {
        let args = expand_argv(argv, ctx)?;
        if let Some(program) = args.first().filter(|name| !ctx.is_builtin(name)) {
            if !open_redirections(redirections, ctx, &mut io)? {
                return Ok(Stage::Done(GENERAL_FAILURE));
            }
            return Ok(match launch_external(&args, ctx, &mut io)? {
                External::Child(child) => Stage::Child(child, program.clone()),
                External::Done(status) => Stage::Done(status),
            });
        }
    }

    // Built-ins, groups and bare redirections run on a thread with their own
    // copy of the shell state
    let mut sub_ctx = ctx.clone_for_subshell();
    let handle = scope.spawn(move || execute(stage, &mut sub_ctx, &io));
    Ok(Stage::Thread(handle))
}

fn finish_stage(stage: Stage<'_>) -> Result<i32, ExecError> {
    match stage {
        Stage::Child(child, program) => Ok(reap(child, &program)),
        Stage::Thread(handle) => handle.join().unwrap_or_else(|_| {
            error!("pipeline stage panicked");
            Ok(GENERAL_FAILURE)
        }),
        Stage::Done(status) => Ok(status),
    }
}

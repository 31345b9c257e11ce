use crate::sh::commands::Executable;
use crate::sh::commands::builtins::env::cd::CdCommand;
use crate::sh::commands::builtins::env::exit::ExitCommand;
use crate::sh::commands::builtins::env::export::ExportCommand;
use crate::sh::commands::builtins::env::printenv::EnvCommand;
use crate::sh::commands::builtins::env::pwd::PwdCommand;
use crate::sh::commands::builtins::env::unset::UnsetCommand;
use crate::sh::commands::builtins::io::echo::EchoCommand;
use crate::sh::commands::dispatch;
use crate::sh::context::ShellContext;
use crate::sh::error::BuiltinError;
use crate::sh::streams::{Sink, Source, Streams};
use crate::sh::testutil::TempDir;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

struct Output {
    result: Result<i32, BuiltinError>,
    stdout: String,
    stderr: String,
}

// Built-in output is small, so reading after the call cannot block.
fn run(command: &dyn Executable, args: &[&str], ctx: &mut ShellContext) -> Output {
    let (mut out_reader, out_writer) = os_pipe::pipe().unwrap();
    let (mut err_reader, err_writer) = os_pipe::pipe().unwrap();
    let mut io = Streams {
        stdin: Source::Null,
        stdout: Sink::Pipe(out_writer),
        stderr: Sink::Pipe(err_writer),
    };
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let result = command.execute(&args, ctx, &mut io);
    drop(io);

    let mut stdout = String::new();
    let mut stderr = String::new();
    out_reader.read_to_string(&mut stdout).unwrap();
    err_reader.read_to_string(&mut stderr).unwrap();
    Output { result, stdout, stderr }
}

fn context(vars: &[(&str, &str)], cwd: &Path) -> ShellContext {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ShellContext::with_environment(env, cwd.to_path_buf())
}

#[test]
fn test_echo() {
    let mut ctx = context(&[], Path::new("/"));
    assert_eq!(run(&EchoCommand, &["echo", "hello", "world"], &mut ctx).stdout, "hello world\n");
    assert_eq!(run(&EchoCommand, &["echo"], &mut ctx).stdout, "\n");
    assert_eq!(run(&EchoCommand, &["echo", "-n", "-nnn", "a", "-n"], &mut ctx).stdout, "a -n");
    assert_eq!(run(&EchoCommand, &["echo", "-nx", "a"], &mut ctx).stdout, "-nx a\n");
    assert_eq!(run(&EchoCommand, &["echo", "-", "a"], &mut ctx).stdout, "- a\n");
}

#[test]
fn test_pwd() {
    let tmp = TempDir::new("builtin-pwd");
    let mut ctx = context(&[], tmp.path());
    let out = run(&PwdCommand, &["pwd"], &mut ctx);
    assert_eq!(out.stdout, format!("{}\n", tmp.path().display()));
    assert_eq!(out.result.unwrap(), 0);
}

#[test]
fn test_cd_relative_and_back() {
    let tmp = TempDir::new("builtin-cd");
    std::fs::create_dir_all(tmp.join("sub")).unwrap();
    let mut ctx = context(&[], tmp.path());

    assert_eq!(run(&CdCommand, &["cd", "sub"], &mut ctx).result.unwrap(), 0);
    assert_eq!(ctx.cwd, tmp.join("sub"));
    assert_eq!(ctx.env["PWD"], tmp.join("sub").to_string_lossy());
    assert_eq!(ctx.env["OLDPWD"], tmp.path().to_string_lossy());

    let out = run(&CdCommand, &["cd", "-"], &mut ctx);
    assert_eq!(out.result.unwrap(), 0);
    assert_eq!(out.stdout, format!("{}\n", tmp.path().display()));
    assert_eq!(ctx.cwd, tmp.path());

    assert_eq!(run(&CdCommand, &["cd", "sub/.."], &mut ctx).result.unwrap(), 0);
    assert_eq!(ctx.cwd, tmp.path());
}

#[test]
fn test_cd_home() {
    let tmp = TempDir::new("builtin-cd-home");
    let home = tmp.path().to_string_lossy().into_owned();
    let mut ctx = context(&[("HOME", &home)], Path::new("/"));
    assert_eq!(run(&CdCommand, &["cd"], &mut ctx).result.unwrap(), 0);
    assert_eq!(ctx.cwd, tmp.path());

    let mut ctx = context(&[], Path::new("/"));
    let err = run(&CdCommand, &["cd"], &mut ctx).result.unwrap_err();
    assert_eq!(err.to_string(), "HOME not set");
    let err = run(&CdCommand, &["cd", "-"], &mut ctx).result.unwrap_err();
    assert_eq!(err.to_string(), "OLDPWD not set");
}

#[test]
fn test_cd_errors_keep_cwd() {
    let tmp = TempDir::new("builtin-cd-errors");
    tmp.write_file("file.txt", "", 0o644);
    let mut ctx = context(&[], tmp.path());

    let err = run(&CdCommand, &["cd", "missing"], &mut ctx).result.unwrap_err();
    assert_eq!(err.to_string(), "missing: No such file or directory");
    let err = run(&CdCommand, &["cd", "file.txt"], &mut ctx).result.unwrap_err();
    assert_eq!(err.to_string(), "file.txt: Not a directory");
    let err = run(&CdCommand, &["cd", "a", "b"], &mut ctx).result.unwrap_err();
    assert_eq!(err.to_string(), "too many arguments");

    assert_eq!(ctx.cwd, tmp.path());
    assert!(!ctx.env.contains_key("OLDPWD"));
}

#[test]
fn test_export_and_unset() {
    let mut ctx = context(&[("KEEP", "1")], Path::new("/"));

    let out = run(&ExportCommand, &["export", "NAME=a b", "EMPTY=", "KEEP"], &mut ctx);
    assert_eq!(out.result.unwrap(), 0);
    assert_eq!(ctx.env["NAME"], "a b");
    assert_eq!(ctx.env["EMPTY"], "");
    assert_eq!(ctx.env["KEEP"], "1");

    let out = run(&ExportCommand, &["export"], &mut ctx);
    assert_eq!(out.stdout, "declare -x EMPTY=''\ndeclare -x KEEP=1\ndeclare -x NAME='a b'\n");

    let out = run(&UnsetCommand, &["unset", "NAME", "NEVER_SET"], &mut ctx);
    assert_eq!(out.result.unwrap(), 0);
    assert!(!ctx.env.contains_key("NAME"));
}

#[test]
fn test_invalid_identifiers() {
    let mut ctx = context(&[], Path::new("/"));

    let out = run(&ExportCommand, &["export", "1X=2", "OK=yes"], &mut ctx);
    assert_eq!(out.result.unwrap(), 1);
    assert_eq!(out.stderr, "export: `1X': not a valid identifier\n");
    assert_eq!(ctx.env["OK"], "yes");

    let out = run(&UnsetCommand, &["unset", "A-B"], &mut ctx);
    assert_eq!(out.result.unwrap(), 1);
    assert_eq!(out.stderr, "unset: `A-B': not a valid identifier\n");
}

#[test]
fn test_env_listing() {
    let mut ctx = context(&[("B", "2"), ("A", "1")], Path::new("/"));
    let out = run(&EnvCommand, &["env"], &mut ctx);
    assert_eq!(out.stdout, "A=1\nB=2\n");
    assert!(run(&EnvCommand, &["env", "-i"], &mut ctx).result.is_err());
}

#[test]
fn test_exit_codes() {
    let mut ctx = context(&[], Path::new("/"));
    ctx.exit_code = 7;
    assert_eq!(run(&ExitCommand, &["exit"], &mut ctx).result.unwrap(), 7);
    assert_eq!(ctx.exit_request, Some(7));

    let mut ctx = context(&[], Path::new("/"));
    run(&ExitCommand, &["exit", "300"], &mut ctx);
    assert_eq!(ctx.exit_request, Some(44));

    let mut ctx = context(&[], Path::new("/"));
    run(&ExitCommand, &["exit", "-1"], &mut ctx);
    assert_eq!(ctx.exit_request, Some(255));

    let mut ctx = context(&[], Path::new("/"));
    let out = run(&ExitCommand, &["exit", "abc"], &mut ctx);
    assert_eq!(out.result.unwrap(), 255);
    assert_eq!(out.stderr, "exit: abc: numeric argument required\n");
    assert_eq!(ctx.exit_request, Some(255));
}

#[test]
fn test_exit_too_many_arguments_does_not_exit() {
    let mut ctx = context(&[], Path::new("/"));
    let out = run(&ExitCommand, &["exit", "1", "2"], &mut ctx);
    assert_eq!(out.result.unwrap_err().to_string(), "too many arguments");
    assert_eq!(ctx.exit_request, None);
}

#[test]
fn test_exit_is_silent_even_when_interactive() {
    let mut ctx = context(&[], Path::new("/"));
    ctx.interactive = true;
    let out = run(&ExitCommand, &["exit", "0"], &mut ctx);
    assert_eq!(out.stderr, "");
    assert_eq!(ctx.exit_request, Some(0));
}

#[test]
fn test_dispatch() {
    let mut ctx = context(&[], Path::new("/"));
    let (mut err_reader, err_writer) = os_pipe::pipe().unwrap();
    let mut io = Streams {
        stdin: Source::Null,
        stdout: Sink::File(std::fs::File::create("/dev/null").unwrap()),
        stderr: Sink::Pipe(err_writer),
    };

    let args = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
    assert_eq!(dispatch(&args(&["ls"]), &mut ctx, &mut io), None);
    assert_eq!(dispatch(&args(&["echo", "x"]), &mut ctx, &mut io), Some(0));
    assert_eq!(dispatch(&args(&["cd", "/nonexistent-dir-xyz"]), &mut ctx, &mut io), Some(1));
    assert_eq!(ctx.cwd, PathBuf::from("/"));
    drop(io);

    let mut stderr = String::new();
    err_reader.read_to_string(&mut stderr).unwrap();
    assert_eq!(stderr, "cd: /nonexistent-dir-xyz: No such file or directory\n");
}

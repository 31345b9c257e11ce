use crate::sh::context::ShellContext;
use crate::sh::error::ShellError;
use crate::sh::run_command_line_with;
use crate::sh::streams::{Sink, Source, Streams};
use std::fs;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory under the system temp dir, removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(label: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("ebash-{}-{}-{}", label, std::process::id(), n));
        if path.exists() {
            fs::remove_dir_all(&path).unwrap();
        }
        fs::create_dir_all(&path).unwrap();
        Self(path.canonicalize().unwrap())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }

    pub fn write_file(&self, name: &str, content: &str, mode: u32) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Output of one line run with captured streams.
pub struct Captured {
    pub result: Result<i32, ShellError>,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn status(&self) -> i32 {
        match &self.result {
            Ok(status) => *status,
            Err(e) => panic!("line failed: {}", e),
        }
    }
}

/// Runs `line` with stdin closed and stdout/stderr going to pipes that are
/// drained on their own threads.
pub fn run_captured(line: &str, ctx: &mut ShellContext) -> Captured {
    let (out_reader, out_writer) = os_pipe::pipe().unwrap();
    let (err_reader, err_writer) = os_pipe::pipe().unwrap();
    let stdout = drain(out_reader);
    let stderr = drain(err_reader);

    let io = Streams {
        stdin: Source::Null,
        stdout: Sink::Pipe(out_writer),
        stderr: Sink::Pipe(err_writer),
    };
    let result = run_command_line_with(line, ctx, &io);
    drop(io);

    Captured {
        result,
        stdout: stdout.join().unwrap(),
        stderr: stderr.join().unwrap(),
    }
}

fn drain(mut reader: os_pipe::PipeReader) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        text
    })
}

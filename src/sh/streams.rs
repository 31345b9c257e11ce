// Owned stdin/stdout/stderr endpoints of one command.
use os_pipe::{PipeReader, PipeWriter};
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::Stdio;

pub enum Source {
    Stdin,
    Null,
    File(File),
    Pipe(PipeReader),
}

pub enum Sink {
    Stdout,
    Stderr,
    File(File),
    Pipe(PipeWriter),
}

impl Source {
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(match self {
            Source::Stdin => Source::Stdin,
            Source::Null => Source::Null,
            Source::File(f) => Source::File(f.try_clone()?),
            Source::Pipe(p) => Source::Pipe(p.try_clone()?),
        })
    }

    pub fn into_stdio(self) -> Stdio {
        match self {
            Source::Stdin => Stdio::inherit(),
            Source::Null => Stdio::null(),
            Source::File(f) => Stdio::from(f),
            Source::Pipe(p) => Stdio::from(p),
        }
    }
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Stdin => io::stdin().read(buf),
            Source::Null => Ok(0),
            Source::File(f) => f.read(buf),
            Source::Pipe(p) => p.read(buf),
        }
    }
}

impl Sink {
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(match self {
            Sink::Stdout => Sink::Stdout,
            Sink::Stderr => Sink::Stderr,
            Sink::File(f) => Sink::File(f.try_clone()?),
            Sink::Pipe(p) => Sink::Pipe(p.try_clone()?),
        })
    }

    // Stdout/Stderr only ever sit in their own slot, so inheriting is exact.
    pub fn into_stdio(self) -> Stdio {
        match self {
            Sink::Stdout | Sink::Stderr => Stdio::inherit(),
            Sink::File(f) => Stdio::from(f),
            Sink::Pipe(p) => Stdio::from(p),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout => io::stdout().write(buf),
            Sink::Stderr => io::stderr().write(buf),
            Sink::File(f) => f.write(buf),
            Sink::Pipe(p) => p.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::File(f) => f.flush(),
            Sink::Pipe(p) => p.flush(),
        }
    }
}

pub struct Streams {
    pub stdin: Source,
    pub stdout: Sink,
    pub stderr: Sink,
}

impl Streams {
    pub fn inherit() -> Self {
        Self {
            stdin: Source::Stdin,
            stdout: Sink::Stdout,
            stderr: Sink::Stderr,
        }
    }

    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self {
            stdin: self.stdin.try_clone()?,
            stdout: self.stdout.try_clone()?,
            stderr: self.stderr.try_clone()?,
        })
    }

    pub fn into_stdio(self) -> (Stdio, Stdio, Stdio) {
        (
            self.stdin.into_stdio(),
            self.stdout.into_stdio(),
            self.stderr.into_stdio(),
        )
    }
}

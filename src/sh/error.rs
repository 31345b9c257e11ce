use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Malformed grammar. Aborts the current line only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected end of input: unterminated {0}")]
    UnterminatedQuote(char),
    #[error("unexpected token `{0}'")]
    UnexpectedToken(String),
    #[error("unbalanced parentheses")]
    UnbalancedParen,
    #[error("missing target for redirection `{0}'")]
    MissingRedirectTarget(String),
    #[error("empty command")]
    Empty,
    #[error("command line too complex")]
    TooComplex,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("malloc error")]
    Allocation(#[from] TryReserveError),
}

/// Why a command name could not be turned into a runnable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("command not found")]
    NotFound,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("is a directory")]
    IsDirectory,
}

impl ResolveError {
    pub fn exit_status(self) -> i32 {
        match self {
            ResolveError::NotFound => 127,
            ResolveError::PermissionDenied | ResolveError::IsDirectory => 126,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("malloc error")]
    Allocation(#[from] TryReserveError),
    #[error("error occured")]
    Expansion(#[from] glob::GlobError),
    #[error("failed to create pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("{program}: {}", io_reason(.source))]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("heredoc: {0}")]
    Heredoc(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure reported by a built-in as `<name>: <message>`.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}: No such file or directory")]
    NoSuchDirectory(String),
    #[error("`{0}': not a valid identifier")]
    InvalidIdentifier(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Everything that can go wrong while handling one input line.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl ShellError {
    /// Allocation failures are reported as `malloc error`, never as bad input.
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            ShellError::Parse(ParseError::Allocation(_)) | ShellError::Exec(ExecError::Allocation(_))
        )
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, ShellError::Parse(ParseError::Syntax(_)))
    }
}

/// `io::Error` text without the trailing `(os error N)`.
pub fn io_reason(error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        io::ErrorKind::IsADirectory => "Is a directory".to_string(),
        io::ErrorKind::NotADirectory => "Not a directory".to_string(),
        _ => {
            let text = error.to_string();
            match text.find(" (os error") {
                Some(end) => text[..end].to_string(),
                None => text,
            }
        }
    }
}

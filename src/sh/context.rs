use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use log::warn;
use crate::sh::commands::Executable;

/// Where heredoc bodies are read from: the terminal, or any reader in tests.
pub type HeredocInput = Arc<Mutex<Box<dyn BufRead + Send>>>;

/// Mutable shell state. Built-ins are the only commands that change it; the
/// engine hands every subshell and pipeline stage its own clone.
#[derive(Clone)]
pub struct ShellContext {
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
    /// Status of the last command, read back by `$?`.
    pub exit_code: i32,
    /// Set by `exit`; stops the rest of the line and the read loop.
    pub exit_request: Option<i32>,
    pub interactive: bool,
    pub registry: Arc<HashMap<String, Box<dyn Executable + Send + Sync>>>,
    pub heredoc_input: HeredocInput,
}

impl ShellContext {
    pub fn new() -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_environment(env, cwd)
    }

    pub fn with_environment(env: HashMap<String, String>, cwd: PathBuf) -> Self {
        let mut ctx = Self {
            cwd,
            env,
            exit_code: 0,
            exit_request: None,
            interactive: false,
            registry: Arc::new(HashMap::new()),
            heredoc_input: Arc::new(Mutex::new(Box::new(io::BufReader::new(io::stdin())))),
        };
        crate::sh::commands::builtins::register_all_builtins(&mut ctx);
        ctx
    }

    pub fn register_command(&mut self, name: &str, command: Box<dyn Executable + Send + Sync>) {
        if let Some(map) = Arc::get_mut(&mut self.registry) {
            map.insert(name.to_string(), command);
        } else {
            warn!("cannot register `{}`: the command registry is already shared", name);
        }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// State for a subshell: same variables and directory, no pending exit.
    pub fn clone_for_subshell(&self) -> Self {
        Self {
            exit_request: None,
            ..self.clone()
        }
    }

    /// `PATH` split on `:`. Empty entries stand for the current directory.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        match self.env.get("PATH") {
            Some(path) => path.split(':').map(PathBuf::from).collect(),
            None => Vec::new(),
        }
    }

    pub fn set_heredoc_input(&mut self, input: impl BufRead + Send + 'static) {
        self.heredoc_input = Arc::new(Mutex::new(Box::new(input)));
    }

    /// Next heredoc line without its newline, `None` at end of input.
    pub fn read_heredoc_line(&self) -> io::Result<Option<String>> {
        if self.interactive {
            eprint!("> ");
            io::stderr().flush()?;
        }
        let mut input = self
            .heredoc_input
            .lock()
            .map_err(|_| io::Error::other("heredoc input lock poisoned"))?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new()
    }
}

use crate::sh::ast::{Word, WordPart};
use crate::sh::context::ShellContext;
use crate::sh::error::ExecError;
use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Expands every word of a command line into its final arguments.
pub fn expand_argv(words: &[Word], ctx: &ShellContext) -> Result<Vec<String>, ExecError> {
    let mut args = Vec::new();
    args.try_reserve(words.len())?;
    for word in words {
        args.extend(expand_word(word, ctx)?);
    }
    Ok(args)
}

/// One word can turn into zero (unquoted empty variable), one, or many
/// (wildcard matches) arguments.
pub fn expand_word(word: &Word, ctx: &ShellContext) -> Result<Vec<String>, ExecError> {
    let mut text = String::new();
    // Same text, with everything that must match literally escaped.
    let mut pattern = String::new();
    let mut has_wildcard = false;

    for (i, part) in word.0.iter().enumerate() {
        match part {
            WordPart::Literal { text: lit, quoted: true } => {
                text.push_str(lit);
                pattern.push_str(&Pattern::escape(lit));
            }
            WordPart::Literal { text: lit, quoted: false } => {
                let mut lit = lit.as_str();
                if i == 0 {
                    if let Some((home, rest)) = split_tilde(lit, ctx) {
                        text.push_str(home);
                        pattern.push_str(&Pattern::escape(home));
                        lit = rest;
                    }
                }
                has_wildcard |= lit.contains(['*', '?', '[']);
                text.push_str(lit);
                pattern.push_str(lit);
            }
            WordPart::Variable { name, .. } => {
                let value = lookup(name, ctx);
                pattern.push_str(&Pattern::escape(&value));
                text.push_str(&value);
            }
        }
    }

    if has_wildcard {
        let matches = glob_in(&pattern, &ctx.cwd)?;
        if !matches.is_empty() {
            return Ok(matches);
        }
    }

    if text.is_empty() && !word.has_quotes() {
        return Ok(Vec::new());
    }
    Ok(vec![text])
}

/// Variable expansion for heredoc bodies: `$NAME`, `${NAME}` and `$?`.
pub fn expand_text(line: &str, ctx: &ShellContext) -> String {
    let mut out = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        match chars.peek() {
            Some('?') => {
                chars.next();
                name.push('?');
            }
            Some('{') => {
                chars.next();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
            }
            _ => {
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
        }
        if name.is_empty() {
            out.push('$');
        } else {
            out.push_str(&lookup(&name, ctx));
        }
    }
    out
}

fn lookup(name: &str, ctx: &ShellContext) -> String {
    if name == "?" {
        return ctx.exit_code.to_string();
    }
    ctx.env.get(name).cloned().unwrap_or_default()
}

// `~` and `~/...` at the start of an unquoted word.
fn split_tilde<'a>(lit: &'a str, ctx: &'a ShellContext) -> Option<(&'a str, &'a str)> {
    let rest = lit.strip_prefix('~')?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let home = ctx.env.get("HOME")?;
    Some((home.as_str(), rest))
}

/// Sorted matches of `pattern` relative to `cwd`. An invalid pattern is not an
/// error: the word is simply kept as typed.
fn glob_in(pattern: &str, cwd: &Path) -> Result<Vec<String>, ExecError> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let absolute = Path::new(pattern).is_absolute();
    let full = if absolute {
        pattern.to_string()
    } else {
        let base = Pattern::escape(&cwd.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), pattern)
    };

    let Ok(paths) = glob::glob_with(&full, options) else {
        return Ok(Vec::new());
    };

    let mut matched = Vec::new();
    for entry in paths {
        let path = entry?;
        let shown = if absolute {
            path.as_path()
        } else {
            path.strip_prefix(cwd).unwrap_or(path.as_path())
        };
        matched.try_reserve(1)?;
        matched.push(shown.to_string_lossy().into_owned());
    }
    matched.sort();
    Ok(matched)
}

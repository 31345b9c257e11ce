use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    // Simple command: "echo hello > out"
    Simple {
        argv: Vec<Word>,
        redirections: Vec<Redirection>,
    },
    // Pipeline: "ls | grep target | wc -l", always two or more stages
    Pipeline(Vec<Node>),
    // Logic AND: "make && ./a.out"
    And(Box<Node>, Box<Node>),
    // Logic OR: "test -f x || touch x"
    Or(Box<Node>, Box<Node>),
    // Subshell: "(cd /tmp && ls) > listing"
    Group {
        inner: Box<Node>,
        redirections: Vec<Redirection>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Input,   // <
    Output,  // >
    Append,  // >>
    Heredoc, // <<
}

impl RedirectKind {
    pub fn symbol(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
            RedirectKind::Append => ">>",
            RedirectKind::Heredoc => "<<",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub kind: RedirectKind,
    /// File name, or the delimiter for a heredoc.
    pub target: Word,
    /// Heredoc text as typed, one `\n`-terminated line each. Read right after
    /// parsing; `None` for other redirections.
    pub body: Option<String>,
}

/// One shell word, kept in pieces so expansion knows what was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word(pub Vec<WordPart>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordPart {
    Literal { text: String, quoted: bool },
    Variable { name: String, quoted: bool },
}

impl Word {
    /// A single unquoted literal, handy for building trees by hand.
    #[cfg(test)]
    pub fn literal(text: &str) -> Self {
        Word(vec![WordPart::Literal {
            text: text.to_string(),
            quoted: false,
        }])
    }

    pub fn push_char(&mut self, c: char, quoted: bool) {
        if let Some(WordPart::Literal { text, quoted: q }) = self.0.last_mut() {
            if *q == quoted {
                text.push(c);
                return;
            }
        }
        self.0.push(WordPart::Literal {
            text: c.to_string(),
            quoted,
        });
    }

    pub fn has_quotes(&self) -> bool {
        self.0.iter().any(|part| match part {
            WordPart::Literal { quoted, .. } | WordPart::Variable { quoted, .. } => *quoted,
        })
    }
}

// Source-like rendering without expansion, used for heredoc delimiters and
// diagnostics.
impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.0 {
            match part {
                WordPart::Literal { text, .. } => f.write_str(text)?,
                WordPart::Variable { name, .. } => write!(f, "${}", name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Node {
    /// Shorthand for a redirection-free simple command of plain words.
    pub fn simple(words: &[&str]) -> Self {
        Node::Simple {
            argv: words.iter().map(|w| Word::literal(w)).collect(),
            redirections: Vec::new(),
        }
    }
}

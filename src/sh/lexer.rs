use crate::sh::ast::{RedirectKind, Word, WordPart};
use crate::sh::error::{ParseError, SyntaxError};
use std::iter::Peekable;
use std::mem;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Word(Word),
    AndIf,
    OrIf,
    Pipe,
    LParen,
    RParen,
    Redirect(RedirectKind),
}

impl TokenKind {
    /// How the token looked in the input, for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Word(word) => word.to_string(),
            TokenKind::AndIf => "&&".to_string(),
            TokenKind::OrIf => "||".to_string(),
            TokenKind::Pipe => "|".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::Redirect(kind) => kind.symbol().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character in the line.
    pub offset: usize,
}

type Chars<'a> = Peekable<CharIndices<'a>>;

struct Scanner {
    tokens: Vec<Token>,
    word: Word,
    word_start: Option<usize>,
}

impl Scanner {
    fn begin(&mut self, at: usize) {
        self.word_start.get_or_insert(at);
    }

    fn push(&mut self, kind: TokenKind, offset: usize) -> Result<(), ParseError> {
        self.tokens.try_reserve(1)?;
        self.tokens.push(Token { kind, offset });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ParseError> {
        if let Some(offset) = self.word_start.take() {
            let mut word = mem::take(&mut self.word);
            if word.0.is_empty() {
                // "" and '' still make an (empty) argument
                word.0.push(WordPart::Literal {
                    text: String::new(),
                    quoted: true,
                });
            }
            self.push(TokenKind::Word(word), offset)?;
        }
        Ok(())
    }
}

pub fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut scanner = Scanner {
        tokens: Vec::new(),
        word: Word::default(),
        word_start: None,
    };
    scanner.tokens.try_reserve(line.len() / 2 + 1)?;

    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_single_quote {
            if c == '\'' {
                in_single_quote = false;
            } else {
                scanner.word.push_char(c, true);
            }
            continue;
        }

        if in_double_quote {
            match c {
                '"' => in_double_quote = false,
                '\\' => match chars.peek() {
                    Some(&(_, next)) if matches!(next, '$' | '"' | '\\') => {
                        chars.next();
                        scanner.word.push_char(next, true);
                    }
                    _ => scanner.word.push_char('\\', true),
                },
                '$' => read_variable(&mut chars, &mut scanner.word, true)?,
                _ => scanner.word.push_char(c, true),
            }
            continue;
        }

        match c {
            '\'' => {
                scanner.begin(i);
                in_single_quote = true;
            }
            '"' => {
                scanner.begin(i);
                in_double_quote = true;
            }
            '\\' => {
                scanner.begin(i);
                match chars.next() {
                    Some((_, escaped)) => scanner.word.push_char(escaped, true),
                    None => scanner.word.push_char('\\', false),
                }
            }
            '$' => {
                scanner.begin(i);
                read_variable(&mut chars, &mut scanner.word, false)?;
            }
            '&' | '|' | '(' | ')' | '<' | '>' => {
                scanner.flush()?;
                let kind = read_operator(c, &mut chars)?;
                scanner.push(kind, i)?;
            }
            c if c.is_whitespace() => scanner.flush()?,
            _ => {
                scanner.begin(i);
                scanner.word.push_char(c, false);
            }
        }
    }

    if in_single_quote {
        return Err(SyntaxError::UnterminatedQuote('\'').into());
    }
    if in_double_quote {
        return Err(SyntaxError::UnterminatedQuote('"').into());
    }
    scanner.flush()?;
    Ok(scanner.tokens)
}

fn read_operator(first: char, chars: &mut Chars<'_>) -> Result<TokenKind, ParseError> {
    let doubled = matches!(chars.peek(), Some(&(_, next)) if next == first);
    let kind = match (first, doubled) {
        ('&', true) => TokenKind::AndIf,
        ('&', false) => return Err(SyntaxError::UnexpectedToken("&".to_string()).into()),
        ('|', true) => TokenKind::OrIf,
        ('|', false) => TokenKind::Pipe,
        ('<', true) => TokenKind::Redirect(RedirectKind::Heredoc),
        ('<', false) => TokenKind::Redirect(RedirectKind::Input),
        ('>', true) => TokenKind::Redirect(RedirectKind::Append),
        ('>', false) => TokenKind::Redirect(RedirectKind::Output),
        ('(', _) => return Ok(TokenKind::LParen),
        (')', _) => return Ok(TokenKind::RParen),
        _ => unreachable!("not an operator start: {first}"),
    };
    if doubled {
        chars.next();
    }
    Ok(kind)
}

// Called right after a `$`. Pushes either a variable part or a literal `$`.
fn read_variable(chars: &mut Chars<'_>, word: &mut Word, quoted: bool) -> Result<(), ParseError> {
    let mut name = String::new();

    match chars.peek().map(|&(_, c)| c) {
        Some('?') => {
            chars.next();
            name.push('?');
        }
        Some('{') => {
            chars.next();
            loop {
                match chars.next() {
                    Some((_, '}')) => break,
                    Some((_, c)) => name.push(c),
                    None => return Err(SyntaxError::UnterminatedQuote('{').into()),
                }
            }
            if name != "?" && !is_identifier(&name) {
                return Err(SyntaxError::UnexpectedToken(format!("${{{}}}", name)).into());
            }
        }
        Some(c) if c.is_ascii_digit() => {
            chars.next();
            name.push(c);
        }
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }
        _ => {
            word.push_char('$', quoted);
            return Ok(());
        }
    }

    word.0.push(WordPart::Variable { name, quoted });
    Ok(())
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

//! Precedence-ladder parser.
//!
//! Each level is a function over a token slice: `&&`/`||` (lowest), then `|`,
//! then `( ... )`, then simple commands. A level scans its slice right to left
//! for the rightmost operator of its own kind outside parentheses and splits
//! there; when none exists it hands the whole slice to the next level. Splitting
//! at the rightmost operator makes `&&`/`||` left-associative.

use crate::sh::ast::{Node, RedirectKind, Redirection};
use crate::sh::error::{ParseError, SyntaxError};
use crate::sh::lexer::{Token, TokenKind, tokenize};
use log::debug;

/// Upper bounds on `&&`/`||` operators and on parenthesis depth. Trees are
/// built, walked and dropped recursively, so these bound the stack used.
const MAX_CONNECTIVES: usize = 256;
const MAX_GROUP_DEPTH: usize = 64;

pub fn parse_command_line(line: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(line)?;
    let node = parse_tokens(&tokens)?;
    debug!("parsed {:?} into {:?}", line, node);
    Ok(node)
}

pub fn parse_tokens(tokens: &[Token]) -> Result<Node, ParseError> {
    if tokens.is_empty() {
        return Err(SyntaxError::Empty.into());
    }
    check_balance(tokens)?;
    parse_and_or(tokens)
}

fn check_balance(tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut depth = 0usize;
    let mut connectives = 0usize;
    for token in tokens {
        match token.kind {
            TokenKind::LParen => {
                depth += 1;
                if depth > MAX_GROUP_DEPTH {
                    return Err(SyntaxError::TooComplex);
                }
            }
            TokenKind::RParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SyntaxError::UnexpectedToken(")".to_string()))?;
            }
            TokenKind::AndIf | TokenKind::OrIf => {
                connectives += 1;
                if connectives > MAX_CONNECTIVES {
                    return Err(SyntaxError::TooComplex);
                }
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err(SyntaxError::UnbalancedParen);
    }
    Ok(())
}

fn unexpected(token: &Token) -> ParseError {
    SyntaxError::UnexpectedToken(token.kind.describe()).into()
}

/// Index of the rightmost token outside parentheses for which `wanted` holds.
fn rfind_top_level(
    tokens: &[Token],
    wanted: impl Fn(&TokenKind) -> bool,
) -> Result<Option<usize>, SyntaxError> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().rev() {
        match &token.kind {
            TokenKind::RParen => depth += 1,
            TokenKind::LParen => {
                depth = depth.checked_sub(1).ok_or(SyntaxError::UnbalancedParen)?;
            }
            kind if depth == 0 && wanted(kind) => return Ok(Some(i)),
            _ => {}
        }
    }
    Ok(None)
}

fn parse_and_or(tokens: &[Token]) -> Result<Node, ParseError> {
    let split = rfind_top_level(tokens, |kind| {
        matches!(kind, TokenKind::AndIf | TokenKind::OrIf)
    })?;
    let Some(i) = split else {
        return parse_pipeline(tokens);
    };

    let op = &tokens[i];
    let (left, right) = (&tokens[..i], &tokens[i + 1..]);
    if left.is_empty() || right.is_empty() {
        return Err(unexpected(op));
    }

    let left = Box::new(parse_and_or(left)?);
    let right = Box::new(parse_and_or(right)?);
    Ok(match op.kind {
        TokenKind::AndIf => Node::And(left, right),
        _ => Node::Or(left, right),
    })
}

fn parse_pipeline(tokens: &[Token]) -> Result<Node, ParseError> {
    let mut stages = Vec::new();
    let mut end = tokens.len();

    while let Some(i) = rfind_top_level(&tokens[..end], |kind| *kind == TokenKind::Pipe)? {
        let stage = &tokens[i + 1..end];
        if stage.is_empty() {
            return Err(unexpected(&tokens[i]));
        }
        stages.try_reserve(1)?;
        stages.push(parse_group(stage)?);
        end = i;
    }

    if stages.is_empty() {
        return parse_group(tokens);
    }
    if end == 0 {
        return Err(unexpected(&tokens[0]));
    }
    stages.try_reserve(1)?;
    stages.push(parse_group(&tokens[..end])?);
    stages.reverse();
    Ok(Node::Pipeline(stages))
}

fn parse_group(tokens: &[Token]) -> Result<Node, ParseError> {
    if tokens[0].kind != TokenKind::LParen {
        return parse_simple(tokens);
    }

    let close = matching_paren(tokens)?;
    let inner = &tokens[1..close];
    if inner.is_empty() {
        return Err(unexpected(&tokens[close]));
    }
    let inner = parse_and_or(inner)?;

    let mut redirections = Vec::new();
    let mut rest = tokens[close + 1..].iter();
    while let Some(token) = rest.next() {
        match &token.kind {
            TokenKind::Redirect(kind) => {
                redirections.try_reserve(1)?;
                redirections.push(read_redirection(*kind, rest.next())?);
            }
            _ => return Err(unexpected(token)),
        }
    }

    Ok(Node::Group {
        inner: Box::new(inner),
        redirections,
    })
}

// `tokens[0]` is `(`.
fn matching_paren(tokens: &[Token]) -> Result<usize, SyntaxError> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(SyntaxError::UnbalancedParen)
}

fn parse_simple(tokens: &[Token]) -> Result<Node, ParseError> {
    let mut argv = Vec::new();
    let mut redirections = Vec::new();
    argv.try_reserve(tokens.len())?;

    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match &token.kind {
            TokenKind::Word(word) => argv.push(word.clone()),
            TokenKind::Redirect(kind) => {
                redirections.try_reserve(1)?;
                redirections.push(read_redirection(*kind, iter.next())?);
            }
            _ => return Err(unexpected(token)),
        }
    }

    Ok(Node::Simple { argv, redirections })
}

fn read_redirection(kind: RedirectKind, target: Option<&Token>) -> Result<Redirection, ParseError> {
    match target {
        Some(Token {
            kind: TokenKind::Word(word),
            ..
        }) => Ok(Redirection {
            kind,
            target: word.clone(),
            body: None,
        }),
        Some(other) => Err(unexpected(other)),
        None => Err(SyntaxError::MissingRedirectTarget(kind.symbol().to_string()).into()),
    }
}

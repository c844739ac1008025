//! Lexer for script bodies using logos

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'a> {
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    /// `?name`, without the question mark
    #[regex(r"\?[A-Za-z_][A-Za-z0-9_]*", priority = 3, callback = |lex| &lex.slice()[1..])]
    Variable(&'a str),

    /// Any other run of non-blank characters
    #[regex(r"[^ \t\r\n\[\]]+", priority = 1, callback = |lex| lex.slice())]
    Word(&'a str),
}

/// A token and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub span: Range<usize>,
}

/// Tokenize `source`. Returns the byte offset of the first character no
/// token matches.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<'_>>, usize> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                span: lexer.span(),
            }),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;

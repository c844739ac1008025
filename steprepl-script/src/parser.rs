//! Parser for script programs and invocation code
//!
//! A program is a list of method definitions, one per line:
//!
//! ```text
//! # comment
//! Greet ?who: Hello ?who [Punctuation]
//! Punctuation: [Is mood excited] !
//! Punctuation: .
//! ```
//!
//! Lines that define the same task are alternative methods, tried in
//! order. A body is a mix of words (output text), `?param` references and
//! `[Task arg ...]` calls. Invocation code is a bare body.

use steprepl_core::{EngineError, EngineResult};

use crate::ast::{Arg, Body, Element, Method, Program};
use crate::lexer::{tokenize, Spanned, Token};

/// Parse a whole program
pub fn parse_program(source: &str) -> EngineResult<Program> {
    let mut program = Program::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let method = parse_method(text, line).map_err(|msg| EngineError::Parse(format!("line {}: {}", line, msg)))?;
        program.add_method(method);
    }
    Ok(program)
}

/// Parse invocation code
pub fn parse_body(source: &str) -> EngineResult<Body> {
    parse_elements(source).map_err(EngineError::Parse)
}

fn parse_method(text: &str, line: usize) -> Result<Method, String> {
    let (header, body) = text
        .split_once(':')
        .ok_or_else(|| "expected 'Task: body'".to_string())?;

    let tokens = tokenize(header).map_err(|at| format!("unexpected character at column {}", at + 1))?;
    let mut tokens = tokens.into_iter().map(|s| s.token);
    let task = match tokens.next() {
        Some(Token::Word(name)) => name.to_string(),
        Some(other) => return Err(format!("expected a task name, found {:?}", other)),
        None => return Err("missing task name".to_string()),
    };
    let mut params = Vec::new();
    for token in tokens {
        match token {
            Token::Variable(name) if !params.iter().any(|p| p == name) => params.push(name.to_string()),
            Token::Variable(name) => return Err(format!("duplicate parameter ?{}", name)),
            other => return Err(format!("expected a ?parameter, found {:?}", other)),
        }
    }

    Ok(Method {
        task,
        params,
        body: parse_elements(body)?,
        line,
    })
}

fn parse_elements(source: &str) -> Result<Body, String> {
    let tokens = tokenize(source).map_err(|at| format!("unexpected character at offset {}", at))?;
    let mut tokens = tokens.into_iter();
    let mut body = Vec::new();

    while let Some(Spanned { token, span }) = tokens.next() {
        match token {
            Token::Word(w) => body.push(Element::Word(w.to_string())),
            Token::Variable(v) => body.push(Element::Var(v.to_string())),
            Token::RBracket => return Err(format!("unmatched ']' at offset {}", span.start)),
            Token::LBracket => body.push(parse_call(&mut tokens, span.start)?),
        }
    }
    Ok(body)
}

fn parse_call<'a>(tokens: &mut impl Iterator<Item = Spanned<'a>>, open: usize) -> Result<Element, String> {
    let task = match tokens.next().map(|s| s.token) {
        Some(Token::Word(name)) => name.to_string(),
        Some(Token::RBracket) => return Err(format!("empty call at offset {}", open)),
        Some(Token::Variable(v)) => return Err(format!("call target must be a task name, not ?{}", v)),
        Some(Token::LBracket) => return Err(format!("nested call at offset {}", open)),
        None => return Err(format!("unclosed '[' at offset {}", open)),
    };

    let mut args = Vec::new();
    loop {
        match tokens.next().map(|s| s.token) {
            Some(Token::RBracket) => return Ok(Element::Call { task, args }),
            Some(Token::Word(w)) => args.push(Arg::Word(w.to_string())),
            Some(Token::Variable(v)) => args.push(Arg::Var(v.to_string())),
            Some(Token::LBracket) => return Err(format!("nested call in arguments of [{}]", task)),
            None => return Err(format!("unclosed '[' at offset {}", open)),
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

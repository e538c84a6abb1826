use std::io::BufRead;

use combine::error::ParseError;
use combine::parser::char::digit;
use combine::stream::Stream;
use combine::{any, choice, many1, parser, satisfy, skip_many, token, Parser};
use tracing::trace;

use super::error::{Error, ErrorKind};
use super::token::Token;

/// Longest prefix of `text` that reads as a float, so `1.2.3` is `1.2` and
/// `.` is `0`.
fn parse_number_prefix(text: &str) -> f64 {
    let digits = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let int_end = digits(text);
    let end = match text[int_end..].strip_prefix('.') {
        Some(frac) => int_end + 1 + digits(frac),
        None => int_end,
    };
    text[..end].parse().unwrap_or(0.0)
}

fn number<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(choice((digit(), token('.')))).map(|ns: String| Token::Number(parse_number_prefix(&ns)))
}

// There are no identifiers in this language. The whole ASCII alphanumeric
// run is swallowed so it yields a single error token.
fn ident<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        satisfy(|c: char| c.is_ascii_alphabetic()),
        skip_many(satisfy(|c: char| c.is_ascii_alphanumeric())),
    )
        .map(|_| Token::Error)
}

fn lex_<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    choice((number(), ident(), any().map(Token::Kwd)))
}

parser! {
    pub(crate) fn lex[Input]()(Input) -> Token
        where [Input: Stream<Token=char>]
    {
        lex_()
    }
}

/// Pulls tokens out of a line-buffered reader, one line at a time, so an
/// interactive session only blocks when it really needs more input.
pub(crate) struct Lexer<R> {
    input: R,
    buf: Vec<u8>,
    line: String,
    pos: usize,
    eof: bool,
    error: Option<ErrorKind>,
}

impl<R: BufRead> Lexer<R> {
    pub(crate) fn new(input: R) -> Self {
        Lexer {
            input,
            buf: Vec::new(),
            line: String::new(),
            pos: 0,
            eof: false,
            error: None,
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            let rest = self.line[self.pos..].trim_start();
            if rest.is_empty() {
                if self.eof || !self.fill_line()? {
                    return Ok(Token::Eof);
                }
                continue;
            }

            let (token, remaining) = lex()
                .parse(rest)
                .map_err(|_| ErrorKind::UnexpectedToken)?;
            let pos = self.line.len() - remaining.len();
            self.pos = pos;

            if token == Token::Error {
                self.error = Some(ErrorKind::IdentifierNotAllowed);
            }
            trace!(?token, "lexed");
            return Ok(token);
        }
    }

    /// The reason behind the last `Token::Error`, if not taken yet.
    pub(crate) fn take_error(&mut self) -> Option<ErrorKind> {
        self.error.take()
    }

    // Bytes that are not UTF-8 become U+FFFD and lex as unknown characters.
    fn fill_line(&mut self) -> Result<bool, Error> {
        self.buf.clear();
        self.pos = 0;
        let n = self.input.read_until(b'\n', &mut self.buf)?;
        self.line = String::from_utf8_lossy(&self.buf).into_owned();
        if n == 0 {
            self.eof = true;
        }
        Ok(n > 0)
    }
}

#[cfg(test)]
fn lex_tokens(s: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(s.as_bytes());
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token().unwrap() {
            Token::Eof => break,
            token => tokens.push(token),
        }
    }
    tokens
}

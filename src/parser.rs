use std::io::BufRead;

use tracing::debug;

use super::ast::{Expr, Function};
use super::error::{Error, ErrorKind};
use super::lexer::Lexer;
use super::precedence::{BinOp, PrecedenceTable};
use super::token::Token;

/// Binary operators allowed in one top-level expression.
pub(crate) const MAX_OPERATORS: usize = 1024;
/// Parenthesized groups allowed to be open at once.
pub(crate) const MAX_PAREN_DEPTH: usize = 256;

/// Recursive-descent parser with precedence climbing for binary operators.
///
/// The parser owns the lexer for the whole session and always holds exactly
/// one token of lookahead in `cur_tok`. A failed parse leaves `cur_tok` at
/// the token that could not be consumed; resynchronizing is up to the caller.
///
/// Expressions are bounded by `MAX_OPERATORS` and `MAX_PAREN_DEPTH` so the
/// tree, and everything that walks it recursively, stays shallow.
pub(crate) struct Parser<'a, R> {
    lexer: Lexer<R>,
    precedence: &'a PrecedenceTable,
    cur_tok: Token,
    operators: usize,
    paren_depth: usize,
}

impl<'a, R: BufRead> Parser<'a, R> {
    /// Reads the first token, blocking until input is available.
    pub(crate) fn new(lexer: Lexer<R>, precedence: &'a PrecedenceTable) -> Result<Self, Error> {
        let mut parser = Parser {
            lexer,
            precedence,
            cur_tok: Token::Eof,
            operators: 0,
            paren_depth: 0,
        };
        parser.next_token()?;
        Ok(parser)
    }

    pub(crate) fn current(&self) -> Token {
        self.cur_tok
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, Error> {
        self.cur_tok = self.lexer.next_token()?;
        Ok(self.cur_tok)
    }

    pub(crate) fn take_lex_error(&mut self) -> Option<ErrorKind> {
        self.lexer.take_error()
    }

    fn token_precedence(&self) -> Option<(BinOp, i32)> {
        match self.cur_tok {
            Token::Kwd(c) => {
                let op = BinOp::try_from(c).ok()?;
                self.precedence.get(op).map(|prec| (op, prec))
            }
            _ => None,
        }
    }

    /// parenexpr ::= '(' expression ')'
    fn parse_paren_expr(&mut self) -> Result<Expr, Error> {
        if self.paren_depth >= MAX_PAREN_DEPTH {
            return Err(ErrorKind::ExpressionTooComplex.into());
        }
        self.next_token()?;
        self.paren_depth += 1;
        let expr = self.parse_expression();
        self.paren_depth -= 1;
        let expr = expr?;
        if self.cur_tok != Token::Kwd(')') {
            return Err(ErrorKind::ExpectedCloseParen.into());
        }
        self.next_token()?;
        Ok(expr)
    }

    /// primary ::= number | parenexpr
    pub(crate) fn parse_primary(&mut self) -> Result<Expr, Error> {
        match self.cur_tok {
            Token::Number(n) => {
                self.next_token()?;
                Ok(Expr::Number(n))
            }
            Token::Kwd('(') => self.parse_paren_expr(),
            _ => Err(ErrorKind::UnexpectedToken.into()),
        }
    }

    /// binoprhs ::= (binop primary)*
    ///
    /// Only operators binding at least as tightly as `expr_prec` are
    /// absorbed into `lhs`.
    pub(crate) fn parse_bin_op_rhs(&mut self, expr_prec: i32, mut lhs: Expr) -> Result<Expr, Error> {
        loop {
            let (op, tok_prec) = match self.token_precedence() {
                Some((op, prec)) if prec >= expr_prec => (op, prec),
                _ => return Ok(lhs),
            };
            if self.operators >= MAX_OPERATORS {
                return Err(ErrorKind::ExpressionTooComplex.into());
            }
            self.operators += 1;
            self.next_token()?;

            let mut rhs = self.parse_primary()?;

            // A tighter operator after rhs takes rhs as its own lhs first.
            if let Some((_, next_prec)) = self.token_precedence() {
                if tok_prec < next_prec {
                    rhs = self.parse_bin_op_rhs(tok_prec + 1, rhs)?;
                }
            }

            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    /// expression ::= primary binoprhs
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, Error> {
        let lhs = self.parse_primary()?;
        self.parse_bin_op_rhs(0, lhs)
    }

    /// toplevelexpr ::= expression
    pub(crate) fn parse_toplevel(&mut self) -> Result<Function, Error> {
        self.operators = 0;
        self.paren_depth = 0;
        let body = self.parse_expression()?;
        debug!(?body, "parsed a top-level expr");
        Ok(Function::anonymous(body))
    }
}

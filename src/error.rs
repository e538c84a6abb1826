use std::fmt::{self, Display};
use std::io;

use failure::{Backtrace, Context, Fail};

#[derive(Debug)]
pub(crate) struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Debug, Eq, PartialEq, Fail)]
pub(crate) enum ErrorKind {
    #[fail(display = "Only numeric literals and operators are permitted.")]
    IdentifierNotAllowed,
    #[fail(display = "expected ')'")]
    ExpectedCloseParen,
    #[fail(display = "unexpected token when expecting an expression")]
    UnexpectedToken,
    #[fail(display = "expression is too complex")]
    ExpressionTooComplex,
    /// Only produced by `BinOp::try_from`; the parser reads it as "this
    /// character has no precedence" and never reports it.
    #[fail(display = "invalid binary operator '{}'", _0)]
    InvalidOperator(char),
    #[fail(display = "function '{}' cannot be redefined", _0)]
    FunctionRedefinition(String),
    #[fail(display = "function verification failed: {}", _0)]
    Verify(String),
    #[fail(display = "codegen: {}", _0)]
    Codegen(String),
    #[fail(display = "failed to read input")]
    Io,
}

impl Error {
    pub(crate) fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        e.context(ErrorKind::Io).into()
    }
}

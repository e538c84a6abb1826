use std::collections::HashMap;
use std::fmt::{self, Display};

use super::error::ErrorKind;

/// Binary operators understood by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BinOp {
    Lt,
    Gt,
    Eq,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub(crate) fn as_char(self) -> char {
        match self {
            BinOp::Lt => '<',
            BinOp::Gt => '>',
            BinOp::Eq => '=',
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }
}

impl TryFrom<char> for BinOp {
    type Error = ErrorKind;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '<' => Ok(BinOp::Lt),
            '>' => Ok(BinOp::Gt),
            '=' => Ok(BinOp::Eq),
            '+' => Ok(BinOp::Add),
            '-' => Ok(BinOp::Sub),
            '*' => Ok(BinOp::Mul),
            '/' => Ok(BinOp::Div),
            c => Err(ErrorKind::InvalidOperator(c)),
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Binding strength of each binary operator. Higher binds tighter.
#[derive(Debug, Clone)]
pub(crate) struct PrecedenceTable {
    table: HashMap<BinOp, i32>,
}

impl PrecedenceTable {
    pub(crate) fn empty() -> Self {
        PrecedenceTable {
            table: HashMap::new(),
        }
    }

    pub(crate) fn set(&mut self, op: BinOp, precedence: i32) {
        self.table.insert(op, precedence);
    }

    /// `None` unless `op` is installed with a positive precedence.
    pub(crate) fn get(&self, op: BinOp) -> Option<i32> {
        self.table.get(&op).copied().filter(|&p| p > 0)
    }
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        let mut table = PrecedenceTable::empty();
        table.set(BinOp::Lt, 10);
        table.set(BinOp::Gt, 10);
        table.set(BinOp::Eq, 10);
        table.set(BinOp::Add, 20);
        table.set(BinOp::Sub, 20);
        table.set(BinOp::Mul, 40);
        table.set(BinOp::Div, 40);
        table
    }
}

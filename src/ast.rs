use super::precedence::BinOp;

/// Name every top-level expression is compiled under.
pub(crate) const ANON_FN_NAME: &str = "__anon_expr";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub(crate) fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}

/// Function name and parameter names.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Prototype(pub(crate) String, pub(crate) Vec<String>);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Function(pub(crate) Box<Prototype>, pub(crate) Box<Expr>);

impl Function {
    /// Wraps a bare expression as the body of a nullary anonymous function.
    pub(crate) fn anonymous(body: Expr) -> Self {
        Function(
            Box::new(Prototype(ANON_FN_NAME.to_owned(), vec![])),
            Box::new(body),
        )
    }
}

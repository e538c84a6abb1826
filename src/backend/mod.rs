//! The IR-emission collaborator the translator drives. `llvm` is the real
//! one; `mock` records calls for tests.

use std::fmt::Debug;

use super::error::Error;

pub(crate) mod llvm;
#[cfg(test)]
pub(crate) mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    FAdd,
    FSub,
    FMul,
    FDiv,
}

/// Unordered comparisons: true if either operand is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RealPredicate {
    ULT,
    UGT,
    UEQ,
}

/// A program unit that functions of `double` parameters returning `double`
/// are declared in, filled through a single insertion point, verified,
/// removed and printed.
pub(crate) trait Backend {
    type Function: Copy + Debug;
    type Value: Copy + Debug;

    fn get_function(&self, name: &str) -> Option<Self::Function>;

    fn declare_function(&mut self, name: &str, params: &[String]) -> Result<Self::Function, Error>;

    fn has_body(&self, function: Self::Function) -> bool;

    /// Parameter names paired with the values standing for them in the body.
    fn params(&self, function: Self::Function) -> Vec<(String, Self::Value)>;

    /// Opens the entry block of `function` and moves the insertion point there.
    fn begin_function_body(&mut self, function: Self::Function) -> Result<(), Error>;

    fn const_real(&mut self, n: f64) -> Self::Value;

    fn build_arith(
        &mut self,
        op: ArithOp,
        lhs: Self::Value,
        rhs: Self::Value,
        name: &str,
    ) -> Result<Self::Value, Error>;

    fn build_fcmp(
        &mut self,
        pred: RealPredicate,
        lhs: Self::Value,
        rhs: Self::Value,
        name: &str,
    ) -> Result<Self::Value, Error>;

    /// Widens an `i1` to `0.0` or `1.0`.
    fn build_ui_to_fp(&mut self, value: Self::Value, name: &str) -> Result<Self::Value, Error>;

    fn build_ret(&mut self, value: Self::Value) -> Result<(), Error>;

    fn verify_function(&self, function: Self::Function) -> Result<(), Error>;

    fn remove_function(&mut self, function: Self::Function);

    fn print_function(&self, function: Self::Function) -> String;

    fn print_module(&self) -> String;
}

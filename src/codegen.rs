use std::collections::HashMap;

use tracing::{debug, trace};

use super::ast::{Expr, Function, Prototype};
use super::backend::{ArithOp, Backend, RealPredicate};
use super::error::{Error, ErrorKind};
use super::precedence::BinOp;

/// Translates the AST into calls on a backend it borrows for its lifetime.
pub(crate) struct CodeGen<'a, B: Backend> {
    backend: &'a mut B,
    named_values: HashMap<String, B::Value>,
}

impl<'a, B: Backend> CodeGen<'a, B> {
    pub(crate) fn new(backend: &'a mut B) -> Self {
        CodeGen {
            backend,
            named_values: HashMap::new(),
        }
    }

    pub(crate) fn codegen_expr(&mut self, e: &Expr) -> Result<B::Value, Error> {
        match e {
            Expr::Number(n) => Ok(self.backend.const_real(*n)),
            Expr::Binary(op, lhs, rhs) => {
                let lhs_val = self.codegen_expr(lhs)?;
                let rhs_val = self.codegen_expr(rhs)?;
                trace!(%op, "binary");
                match op {
                    BinOp::Add => self.backend.build_arith(ArithOp::FAdd, lhs_val, rhs_val, "addtmp"),
                    BinOp::Sub => self.backend.build_arith(ArithOp::FSub, lhs_val, rhs_val, "subtmp"),
                    BinOp::Mul => self.backend.build_arith(ArithOp::FMul, lhs_val, rhs_val, "multmp"),
                    BinOp::Div => self.backend.build_arith(ArithOp::FDiv, lhs_val, rhs_val, "divtmp"),
                    BinOp::Lt => self.codegen_compare(RealPredicate::ULT, lhs_val, rhs_val),
                    BinOp::Gt => self.codegen_compare(RealPredicate::UGT, lhs_val, rhs_val),
                    BinOp::Eq => self.codegen_compare(RealPredicate::UEQ, lhs_val, rhs_val),
                }
            }
        }
    }

    // There is no boolean type, so comparisons come back as 0.0 or 1.0.
    fn codegen_compare(
        &mut self,
        pred: RealPredicate,
        lhs: B::Value,
        rhs: B::Value,
    ) -> Result<B::Value, Error> {
        let i = self.backend.build_fcmp(pred, lhs, rhs, "cmptmp")?;
        self.backend.build_ui_to_fp(i, "booltmp")
    }

    /// Declares `double name(double, ...)`, or returns the function already
    /// declared under that name.
    pub(crate) fn codegen_proto(&mut self, p: &Prototype) -> Result<B::Function, Error> {
        let Prototype(name, args) = p;
        match self.backend.get_function(name) {
            Some(f) => Ok(f),
            None => {
                debug!(%name, arity = args.len(), "declare function");
                self.backend.declare_function(name, args)
            }
        }
    }

    /// Emits a complete function. If anything after the declaration fails the
    /// function is removed from the program unit again.
    pub(crate) fn codegen_func(&mut self, f: &Function) -> Result<B::Function, Error> {
        let Function(proto, body) = f;
        let the_function = self.codegen_proto(proto)?;

        if self.backend.has_body(the_function) {
            return Err(ErrorKind::FunctionRedefinition(proto.0.clone()).into());
        }

        match self.codegen_body(the_function, body) {
            Ok(()) => Ok(the_function),
            Err(e) => {
                debug!(error = %e, name = %proto.0, "removing function");
                self.backend.remove_function(the_function);
                Err(e)
            }
        }
    }

    fn codegen_body(&mut self, the_function: B::Function, body: &Expr) -> Result<(), Error> {
        self.backend.begin_function_body(the_function)?;

        self.named_values.clear();
        self.named_values.extend(self.backend.params(the_function));
        trace!(params = ?self.named_values.keys().collect::<Vec<_>>(), "bound parameters");

        let ret_val = self.codegen_expr(body)?;
        self.backend.build_ret(ret_val)?;
        self.backend.verify_function(the_function)
    }
}

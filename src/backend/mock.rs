//! Backend that records the calls made on it, for translator and driver
//! tests.

use super::{ArithOp, Backend, RealPredicate};
use crate::error::{Error, ErrorKind};

/// Records every backend call; one named call can be made to fail.
#[derive(Default)]
pub(crate) struct MockBackend {
    pub(crate) calls: Vec<String>,
    pub(crate) functions: Vec<(String, Vec<String>, bool)>,
    fail_on: Option<&'static str>,
    next_value: usize,
}

impl MockBackend {
    pub(crate) fn failing(call: &'static str) -> Self {
        MockBackend {
            fail_on: Some(call),
            ..MockBackend::default()
        }
    }

    fn record(&mut self, call: String) -> Result<(), Error> {
        let failed = self.fail_on.map_or(false, |f| call.starts_with(f));
        self.calls.push(call);
        if failed {
            return Err(ErrorKind::Codegen("mock failure".to_owned()).into());
        }
        Ok(())
    }

    fn fresh(&mut self) -> usize {
        self.next_value += 1;
        self.next_value
    }
}

impl Backend for MockBackend {
    type Function = usize;
    type Value = usize;

    fn get_function(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|(n, _, _)| n == name)
    }

    fn declare_function(&mut self, name: &str, params: &[String]) -> Result<usize, Error> {
        self.record(format!("declare {}", name))?;
        self.functions.push((name.to_owned(), params.to_vec(), false));
        Ok(self.functions.len() - 1)
    }

    fn has_body(&self, function: usize) -> bool {
        self.functions[function].2
    }

    fn params(&self, function: usize) -> Vec<(String, usize)> {
        self.functions[function]
            .1
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), 100 + i))
            .collect()
    }

    fn begin_function_body(&mut self, function: usize) -> Result<(), Error> {
        self.record(format!("begin {}", function))?;
        self.functions[function].2 = true;
        Ok(())
    }

    fn const_real(&mut self, n: f64) -> usize {
        self.calls.push(format!("const {}", n));
        self.fresh()
    }

    fn build_arith(&mut self, op: ArithOp, lhs: usize, rhs: usize, name: &str) -> Result<usize, Error> {
        self.record(format!("{:?} {} {} {}", op, lhs, rhs, name))?;
        Ok(self.fresh())
    }

    fn build_fcmp(
        &mut self,
        pred: RealPredicate,
        lhs: usize,
        rhs: usize,
        name: &str,
    ) -> Result<usize, Error> {
        self.record(format!("fcmp {:?} {} {} {}", pred, lhs, rhs, name))?;
        Ok(self.fresh())
    }

    fn build_ui_to_fp(&mut self, value: usize, name: &str) -> Result<usize, Error> {
        self.record(format!("uitofp {} {}", value, name))?;
        Ok(self.fresh())
    }

    fn build_ret(&mut self, value: usize) -> Result<(), Error> {
        self.record(format!("ret {}", value))
    }

    fn verify_function(&self, _function: usize) -> Result<(), Error> {
        match self.fail_on {
            Some("verify") => Err(ErrorKind::Verify("mock".to_owned()).into()),
            _ => Ok(()),
        }
    }

    fn remove_function(&mut self, function: usize) {
        self.calls.push(format!("remove {}", function));
        self.functions.remove(function);
    }

    fn print_function(&self, function: usize) -> String {
        self.functions[function].0.clone()
    }

    fn print_module(&self) -> String {
        format!("; {} functions\n", self.functions.len())
    }
}

mod ast;
mod backend;
mod codegen;
mod error;
mod lexer;
mod parser;
mod precedence;
mod token;
mod toplevel;

use std::io::{self, stdin, stdout};
use std::process;

use tracing_subscriber::EnvFilter;

use precedence::PrecedenceTable;

const MODULE_NAME: &str = "my cool jit";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let precedence = PrecedenceTable::default();
    let mut backend = backend::llvm::Module::new(MODULE_NAME);

    let stdin = stdin();
    let stdout = stdout();
    let result = toplevel::run(
        stdin.lock(),
        &precedence,
        &mut backend,
        &mut stdout.lock(),
        &mut io::stderr(),
    );

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

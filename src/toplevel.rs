use std::io::{BufRead, Write};

use tracing::debug;

use super::backend::Backend;
use super::codegen::CodeGen;
use super::error::{Error, ErrorKind};
use super::lexer::Lexer;
use super::parser::Parser;
use super::precedence::PrecedenceTable;
use super::token::Token;

const PROMPT: &str = "ready> ";

/// Compiles every top-level expression read from `input`, then prints the
/// whole program unit.
///
/// IR goes to `out`; prompts and diagnostics go to `diag`. Malformed input is
/// reported and skipped. Only an I/O failure ends the session early.
pub(crate) fn run<R, B, O, D>(
    input: R,
    precedence: &PrecedenceTable,
    backend: &mut B,
    out: &mut O,
    diag: &mut D,
) -> Result<(), Error>
where
    R: BufRead,
    B: Backend,
    O: Write,
    D: Write,
{
    prompt(diag)?;
    let mut parser = Parser::new(Lexer::new(input), precedence)?;

    main_loop(&mut parser, backend, out, diag)?;

    write!(out, "{}", backend.print_module())?;
    out.flush()?;
    Ok(())
}

/// top ::= expression | ';'
pub(crate) fn main_loop<R, B, O, D>(
    parser: &mut Parser<'_, R>,
    backend: &mut B,
    out: &mut O,
    diag: &mut D,
) -> Result<(), Error>
where
    R: BufRead,
    B: Backend,
    O: Write,
    D: Write,
{
    loop {
        prompt(diag)?;
        match parser.current() {
            Token::Eof => return Ok(()),
            Token::Error => {
                report_lex_error(parser, diag)?;
                parser.next_token()?;
            }
            Token::Kwd(';') => {
                parser.next_token()?;
            }
            _ => handle_toplevel_expression(parser, backend, out, diag)?,
        }
    }
}

fn handle_toplevel_expression<R, B, O, D>(
    parser: &mut Parser<'_, R>,
    backend: &mut B,
    out: &mut O,
    diag: &mut D,
) -> Result<(), Error>
where
    R: BufRead,
    B: Backend,
    O: Write,
    D: Write,
{
    let result = parser
        .parse_toplevel()
        .and_then(|f| CodeGen::new(&mut *backend).codegen_func(&f));

    match result {
        Ok(the_function) => {
            writeln!(out, "{}", backend.print_function(the_function))?;
            out.flush()?;
            // Every top-level expression is `__anon_expr`; drop it so the
            // next one can take the name.
            backend.remove_function(the_function);
            Ok(())
        }
        Err(e) if e.kind() == &ErrorKind::Io => Err(e),
        Err(e) => {
            report_lex_error(parser, diag)?;
            writeln!(diag, "Error: {}", e)?;
            debug!(token = ?parser.current(), "skipping token for error recovery");
            parser.next_token()?;
            Ok(())
        }
    }
}

fn report_lex_error<R: BufRead, D: Write>(
    parser: &mut Parser<'_, R>,
    diag: &mut D,
) -> Result<(), Error> {
    if let Some(kind) = parser.take_lex_error() {
        writeln!(diag, "Error: {}", kind)?;
    }
    Ok(())
}

fn prompt<D: Write>(diag: &mut D) -> Result<(), Error> {
    write!(diag, "{}", PROMPT)?;
    diag.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::backend::{llvm, mock::MockBackend};
    use super::*;
    use test_case::test_case;

    fn session_bytes<B: Backend>(input: &[u8], backend: &mut B) -> (String, String) {
        let precedence = PrecedenceTable::default();
        let (mut out, mut diag) = (Vec::new(), Vec::new());
        run(input, &precedence, backend, &mut out, &mut diag).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(diag).unwrap(),
        )
    }

    fn session(input: &str) -> (String, String) {
        session_bytes(input.as_bytes(), &mut llvm::Module::new("test"))
    }

    /// The operand of every `ret double` in the printed IR, in order.
    fn returns(out: &str) -> Vec<&str> {
        out.lines()
            .filter_map(|l| l.trim().strip_prefix("ret double "))
            .collect()
    }

    fn assert_module_trailer(out: &str) {
        let header = out.rfind("; ModuleID = 'test'").unwrap();
        assert!(!out[header..].contains("define"));
    }

    #[test_case("8 - 3 - 2;", "3.000000e+00"; "left associative")]
    #[test_case("2 + 3 * 4;", "1.400000e+01"; "precedence")]
    #[test_case("(2 + 3) * 4;", "2.000000e+01"; "parentheses")]
    #[test_case("3 < 5;", "1.000000e+00"; "less than")]
    #[test_case("3 > 5;", "0.000000e+00"; "greater than")]
    #[test_case("3 = 3;", "1.000000e+00"; "equal")]
    #[test_case("1 / 10;", "0x3FB999999999999A"; "inexact constant")]
    fn test_expression(input: &str, ret: &str) {
        let (out, diag) = session(input);
        assert_eq!(out.matches("define double @__anon_expr()").count(), 1);
        assert_eq!(returns(&out), vec![ret]);
        assert_module_trailer(&out);
        assert!(!diag.contains("Error"));
    }

    #[test]
    fn test_several_units() {
        let (out, _) = session("1 + 1; 2 * 2\n;\n");
        assert_eq!(returns(&out), vec!["2.000000e+00", "4.000000e+00"]);
        assert_module_trailer(&out);
    }

    #[test]
    fn test_unmatched_paren() {
        let (out, diag) = session("(1 + 2;");
        assert!(!out.contains("define"));
        assert!(out.contains("; ModuleID = 'test'"));
        assert!(diag.contains("Error: expected ')'"));
    }

    #[test]
    fn test_recovers_after_error() {
        let (out, diag) = session(") 4 + 5;");
        assert!(diag.contains("Error: unexpected token when expecting an expression"));
        assert_eq!(returns(&out), vec!["9.000000e+00"]);
    }

    #[test]
    fn test_identifier_is_rejected() {
        let (out, diag) = session("abc; 1 + xyz; 7;");
        assert_eq!(
            diag.matches("Only numeric literals and operators are permitted.")
                .count(),
            2
        );
        assert_eq!(returns(&out), vec!["7.000000e+00"]);
    }

    #[test]
    fn test_separator_only() {
        let (out, diag) = session(";");
        assert!(!out.contains("define"));
        assert!(out.starts_with("; ModuleID = 'test'"));
        assert_eq!(diag, PROMPT.repeat(3));
    }

    #[test]
    fn test_empty_input() {
        let (out, diag) = session("");
        assert!(!out.contains("define"));
        assert!(out.starts_with("; ModuleID = 'test'"));
        assert_eq!(diag, PROMPT.repeat(2));
    }

    #[test]
    fn test_unknown_operator_is_skipped() {
        let (out, diag) = session("6 % 2;");
        assert!(diag.contains("Error: unexpected token when expecting an expression"));
        assert_eq!(returns(&out), vec!["6.000000e+00", "2.000000e+00"]);
    }

    #[test]
    fn test_invalid_utf8_line() {
        let mut module = llvm::Module::new("test");
        let (out, diag) = session_bytes(b"1 + 2;\n\xff;\n3;\n", &mut module);
        assert_eq!(returns(&out), vec!["3.000000e+00", "3.000000e+00"]);
        assert_module_trailer(&out);
        assert_eq!(diag.matches("Error:").count(), 1);
    }

    #[test]
    fn test_long_expression() {
        let input = format!("1{};", "+1".repeat(20_000));
        let (out, diag) = session(&input);
        assert!(diag.contains("Error: expression is too complex"));
        assert_eq!(out.matches("define double @__anon_expr()").count(), 1);
        assert_module_trailer(&out);
    }

    #[test]
    fn test_deep_nesting() {
        let input = format!("{}1{};", "(".repeat(10_000), ")".repeat(10_000));
        let (out, diag) = session(&input);
        assert!(diag.contains("Error: expression is too complex"));
        assert!(out.contains("; ModuleID = 'test'"));
    }

    #[test]
    fn test_translation_failure() {
        let mut backend = MockBackend::failing("FAdd");
        let (out, diag) = session_bytes(b"1 + 2 3 4;", &mut backend);
        assert!(diag.contains("Error: codegen: mock failure"));
        assert_eq!(diag.matches("Error:").count(), 1);
        // `3` is the one token skipped after the failure.
        assert!(!backend.calls.iter().any(|c| c == "const 3"));
        assert!(backend.calls.iter().any(|c| c == "const 4"));
        assert_eq!(out, "__anon_expr\n; 0 functions\n");
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Kwd(char),
    Eof,
    Error,
}

//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
};

use smol_str::SmolStr;

use crate::tokens::{Span, Token, TokenKind};

pub type BitsyResult<T> = std::result::Result<T, BitsyError>;

/// Process exit statuses, as defined by BSD `sysexits.h`.
pub mod sysexits {
    pub const EX_USAGE: i32 = 64;
    pub const EX_DATAERR: i32 = 65;
    pub const EX_NOINPUT: i32 = 66;
    pub const EX_SOFTWARE: i32 = 70;
    pub const EX_IOERR: i32 = 74;
}

#[derive(Debug)]
pub enum BitsyError {
    Lex(LexError),
    Syntax(SyntaxError),
    Codegen(CodegenError),
    /// Blocks or parentheses nested deeper than the parser allows.
    NestingLimit { limit: usize, span: Span },
    Runtime(RuntimeError),
    /// External toolchain failed to build the intermediate source.
    Build { command: String, status: Option<i32> },
    /// Compiled program exited unsuccessfully when run after building.
    Run { command: String, status: Option<i32> },
    /// Source code could not be located or read.
    NoInput(String),
    Usage(String),
    Io(io::Error),
}

impl BitsyError {
    /// Exit status the command line driver terminates with.
    pub fn exit_code(&self) -> i32 {
        use sysexits::*;

        match self {
            Self::Lex(_) | Self::Syntax(_) | Self::Codegen(_) | Self::NestingLimit { .. } => {
                EX_DATAERR
            }
            Self::Runtime(_) | Self::Build { .. } | Self::Run { .. } => EX_SOFTWARE,
            Self::NoInput(_) => EX_NOINPUT,
            Self::Usage(_) => EX_USAGE,
            Self::Io(_) => EX_IOERR,
        }
    }

    /// Location in the source the error points at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(err) => Some(err.span),
            Self::Syntax(err) => Some(err.span),
            Self::NestingLimit { span, .. } => Some(*span),
            _ => None,
        }
    }
}

impl Display for BitsyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "lexical error: {err}"),
            Self::Syntax(err) => write!(f, "syntax error: {err}"),
            Self::Codegen(err) => write!(f, "code generation error: {err}"),
            Self::NestingLimit { limit, .. } => {
                write!(f, "syntax error: nesting deeper than {limit} levels")
            }
            Self::Runtime(err) => write!(f, "runtime error: {err}"),
            Self::Build {
                command,
                status: Some(code),
            } => write!(f, "build command `{command}` exited with status {code}"),
            Self::Build {
                command,
                status: None,
            } => write!(f, "build command `{command}` was terminated by a signal"),
            Self::Run {
                command,
                status: Some(code),
            } => write!(f, "program `{command}` exited with status {code}"),
            Self::Run {
                command,
                status: None,
            } => write!(f, "program `{command}` was terminated by a signal"),
            Self::NoInput(msg) => write!(f, "{msg}"),
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BitsyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for BitsyError {
    fn from(err: LexError) -> Self {
        BitsyError::Lex(err)
    }
}

impl From<SyntaxError> for BitsyError {
    fn from(err: SyntaxError) -> Self {
        BitsyError::Syntax(err)
    }
}

impl From<CodegenError> for BitsyError {
    fn from(err: CodegenError) -> Self {
        BitsyError::Codegen(err)
    }
}

impl From<RuntimeError> for BitsyError {
    fn from(err: RuntimeError) -> Self {
        BitsyError::Runtime(err)
    }
}

impl From<io::Error> for BitsyError {
    fn from(err: io::Error) -> Self {
        BitsyError::Io(err)
    }
}

/// Malformed character run encountered by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Character that can't start any token.
    IllegalCharacter(char),
    /// Run of more than one operator character, like `+-`.
    IllegalOperator(SmolStr),
    /// Source ended before the closing `}` of a comment.
    UnterminatedComment,
    /// Source longer than a [`Span`] offset can address.
    SourceTooLarge(usize),
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::IllegalCharacter(c) => {
                write!(f, "illegal character \"{}\"", c.escape_default())
            }
            LexErrorKind::IllegalOperator(text) => write!(f, "illegal operator \"{text}\""),
            LexErrorKind::UnterminatedComment => {
                write!(f, "unterminated comment, expected \"}}\" before end of input")
            }
            LexErrorKind::SourceTooLarge(len) => {
                write!(f, "source of {len} bytes exceeds the {} byte limit", u32::MAX)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Error returned when an unexpected token kind is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub expected: TokenKind,
    /// Offending token, `None` at end of input.
    pub found: Option<Token>,
    pub span: Span,
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(token) => write!(
                f,
                "expecting `{}` but received `{}`",
                self.expected, token
            ),
            None => write!(
                f,
                "expecting `{}` but reached end of input",
                self.expected
            ),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Problems found by a backend after the instruction stream was accepted
/// by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// Integer literal doesn't fit in the machine word.
    IntegerOverflow(SmolStr),
    BreakOutsideLoop,
    /// Block instructions did not pair up, like an `else` without `if`.
    Unbalanced(&'static str),
}

impl Display for CodegenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerOverflow(text) => write!(f, "integer literal {text} is out of range"),
            Self::BreakOutsideLoop => write!(f, "BREAK outside of a LOOP"),
            Self::Unbalanced(msg) => write!(f, "unbalanced block: {msg}"),
        }
    }
}

impl std::error::Error for CodegenError {}

/// Fault raised by a compiled program while executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    DivisionByZero,
    StackUnderflow,
    /// Configured step budget ran out before the program halted.
    StepLimit(usize),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::StackUnderflow => write!(f, "operand stack underflow"),
            Self::StepLimit(steps) => write!(f, "program did not halt within {steps} steps"),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Error rendered against the source it was found in.
///
/// ```text
/// error: syntax error: expecting `(` but received `END`
///  --> 1:17
///   |
/// 1 | BEGIN PRINT 1 + END
///   |                 ^^^
/// ```
pub struct Diagnostic<'a> {
    source_code: &'a str,
    error: &'a BitsyError,
}

impl<'a> Diagnostic<'a> {
    pub fn new(source_code: &'a str, error: &'a BitsyError) -> Self {
        Self { source_code, error }
    }
}

impl<'a> Display for Diagnostic<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.error)?;

        if let Some(span) = self.error.span() {
            let (line_no, column) = span.line_column(self.source_code);
            let (line, line_span) = span.surrounding_line(self.source_code);

            // Underline the part of the span on the first line, at least one caret.
            let visible = span.size.min(line_span.end().saturating_sub(span.index));
            let width = Span::new(span.index, visible)
                .fragment(self.source_code)
                .chars()
                .count()
                .max(1);

            let gutter = " ".repeat(line_no.to_string().len());
            writeln!(f, "{gutter}--> {line_no}:{column}")?;
            writeln!(f, "{gutter} |")?;
            writeln!(f, "{line_no} | {line}")?;
            writeln!(
                f,
                "{gutter} | {}{}",
                " ".repeat(column - 1),
                "^".repeat(width)
            )?;
        }

        Ok(())
    }
}

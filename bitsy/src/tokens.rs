//! Tokens
use std::fmt;

use smol_str::SmolStr;

use crate::codegen::{Condition, Operation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Full lexeme in the source, including the braces of a comment.
    pub span: Span,
    /// Text for the kinds that don't spell themselves.
    ///
    /// Empty for parens, operators and keywords.
    value: SmolStr,
}

impl Token {
    /// Token whose text is implied by its kind.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        debug_assert!(kind.literal().is_some(), "{kind:?} carries its own text");
        Self {
            kind,
            span,
            value: SmolStr::default(),
        }
    }

    /// Token carrying text taken from the source.
    pub fn with_text(kind: TokenKind, text: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            kind,
            span,
            value: text.into(),
        }
    }

    /// Literal text of the token.
    ///
    /// For comments this is the enclosed text, without the braces.
    pub fn text(&self) -> &str {
        self.kind.literal().unwrap_or(self.value.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[rustfmt::skip]
pub enum TokenKind {
    // ------------------------------------------------------------------------
    // Separators
    Whitespace,
    Comment,     // { ... }

    // ------------------------------------------------------------------------
    // Identifiers
    Variable,
    Integer,

    // ------------------------------------------------------------------------
    // Parens
    LeftParen,   // (
    RightParen,  // )

    // ------------------------------------------------------------------------
    // Operators
    Plus,        // +
    Minus,       // -
    Multiply,    // *
    Divide,      // /
    Modulus,     // %
    Assignment,  // =

    // ------------------------------------------------------------------------
    // Keywords
    Begin,       // BEGIN
    End,         // END
    IfP,         // IFP
    IfZ,         // IFZ
    IfN,         // IFN
    Else,        // ELSE
    Loop,        // LOOP
    Break,       // BREAK
    Print,       // PRINT
    Read,        // READ
}

/// Grouping of token kinds used by the parser to dispatch statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordClass {
    /// One of `IFP`, `IFZ` or `IFN`.
    Conditional(Condition),
    Other,
}

impl TokenKind {
    /// Reserved word spelled exactly by the given identifier.
    ///
    /// Keywords are case sensitive.
    #[rustfmt::skip]
    pub fn keyword(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "BEGIN" => Some(Self::Begin),
            "END"   => Some(Self::End),
            "IFP"   => Some(Self::IfP),
            "IFZ"   => Some(Self::IfZ),
            "IFN"   => Some(Self::IfN),
            "ELSE"  => Some(Self::Else),
            "LOOP"  => Some(Self::Loop),
            "BREAK" => Some(Self::Break),
            "PRINT" => Some(Self::Print),
            "READ"  => Some(Self::Read),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn operator(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '%' => Some(Self::Modulus),
            '=' => Some(Self::Assignment),
            _ => None,
        }
    }

    /// Source text of kinds that always spell the same way.
    #[rustfmt::skip]
    pub fn literal(&self) -> Option<&'static str> {
        match self {
            Self::Whitespace
            | Self::Comment
            | Self::Variable
            | Self::Integer    => None,
            Self::LeftParen    => Some("("),
            Self::RightParen   => Some(")"),
            Self::Plus         => Some("+"),
            Self::Minus        => Some("-"),
            Self::Multiply     => Some("*"),
            Self::Divide       => Some("/"),
            Self::Modulus      => Some("%"),
            Self::Assignment   => Some("="),
            Self::Begin        => Some("BEGIN"),
            Self::End          => Some("END"),
            Self::IfP          => Some("IFP"),
            Self::IfZ          => Some("IFZ"),
            Self::IfN          => Some("IFN"),
            Self::Else         => Some("ELSE"),
            Self::Loop         => Some("LOOP"),
            Self::Break        => Some("BREAK"),
            Self::Print        => Some("PRINT"),
            Self::Read         => Some("READ"),
        }
    }

    /// Whitespace and comments carry no meaning for the grammar.
    #[inline]
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Kinds that close a block without being part of it.
    #[inline]
    pub fn is_block_end(&self) -> bool {
        matches!(self, Self::End | Self::Else)
    }

    pub fn classify(&self) -> KeywordClass {
        match self {
            Self::IfP => KeywordClass::Conditional(Condition::Positive),
            Self::IfN => KeywordClass::Conditional(Condition::Negative),
            Self::IfZ => KeywordClass::Conditional(Condition::Zero),
            _ => KeywordClass::Other,
        }
    }

    /// Operation of an expression level operator, `+` or `-`.
    pub fn additive_operation(&self) -> Option<Operation> {
        match self {
            Self::Plus => Some(Operation::Add),
            Self::Minus => Some(Operation::Subtract),
            _ => None,
        }
    }

    /// Operation of a term level operator, `*`, `/` or `%`.
    pub fn multiplicative_operation(&self) -> Option<Operation> {
        match self {
            Self::Multiply => Some(Operation::Multiply),
            Self::Divide => Some(Operation::Divide),
            Self::Modulus => Some(Operation::Modulus),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.literal() {
            Some(literal) => write!(f, "{literal}"),
            None => match self {
                Self::Whitespace => write!(f, "whitespace"),
                Self::Comment => write!(f, "comment"),
                Self::Variable => write!(f, "variable"),
                Self::Integer => write!(f, "integer"),
                _ => Ok(()),
            },
        }
    }
}

/// Chunk of source code, encoded as a starting byte position and size.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    /// Span between two byte positions, end exclusive.
    #[inline]
    pub fn between(start: u32, end: u32) -> Self {
        debug_assert!(end >= start);
        Self {
            index: start,
            size: end - start,
        }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.end() as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// One-based line and column of the span start.
    ///
    /// Columns count characters, not bytes.
    pub fn line_column(&self, text: &str) -> (usize, usize) {
        let before = &text[..(self.index as usize).min(text.len())];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, column)
    }

    /// Line of text containing the start of the span, with its span.
    ///
    /// The trailing newline is not included.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        let index = (self.index as usize).min(text.len());

        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..]
            .find('\n')
            .map(|i| index + i)
            .unwrap_or(text.len());

        (&text[start..end], Span::between(start as u32, end as u32))
    }
}

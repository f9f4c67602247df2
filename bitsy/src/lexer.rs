//! Lexical analysis
use log::trace;

use crate::{
    cursor::CharCursor,
    error::{LexError, LexErrorKind},
    tokens::{Span, Token, TokenKind},
};

const COMMENT_OPEN: char = '{';
const COMMENT_CLOSE: char = '}';

/// Breaks Bitsy source into tokens, one token of lookahead at a time.
///
/// Every character of the source ends up in exactly one token, including
/// whitespace and comments. Skipping those is left to the parser.
pub struct Lexer<'a> {
    /// Character scanner
    cursor: CharCursor<'a>,
    /// Most recently lexed token. Empty once the source is exhausted.
    current: Option<Token>,
    /// Start absolute byte position of the token being lexed.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Result<Self, LexError> {
        Self::from_cursor(CharCursor::new(source_code))
    }

    /// Build a lexer over the given cursor and lex the first token.
    pub fn from_cursor(cursor: CharCursor<'a>) -> Result<Self, LexError> {
        check_source_len(cursor.source_code().len())?;

        let start_pos = cursor.offset();
        let mut lexer = Self {
            cursor,
            current: None,
            start_pos,
        };

        // The lexer always holds one token ahead of the consumer.
        lexer.advance()?;

        Ok(lexer)
    }

    /// Original source code that was passed in during construction.
    #[inline]
    pub fn source_code(&self) -> &'a str {
        self.cursor.source_code()
    }

    /// Token at the head of the stream.
    ///
    /// Returns `None` when the source is exhausted.
    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Indicates whether there are characters left beyond the current token.
    #[inline]
    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    /// Lex the next token into the current slot.
    pub fn advance(&mut self) -> Result<(), LexError> {
        self.current = self.next_token()?;
        Ok(())
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Each call starts with the cursor on the first character of the
    /// token, and leaves it on the first character after it.
    #[rustfmt::skip]
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.start_token();

        let c = match self.cursor.current() {
            Some(c) => c,
            None => return Ok(None),
        };

        let token = match c {
            ' ' | '\t' | '\n'            => self.consume_whitespace(),
            '0'..='9'                    => self.consume_integer(),
            '('                          => self.consume_paren(TokenKind::LeftParen),
            ')'                          => self.consume_paren(TokenKind::RightParen),
            '_' | 'a'..='z' | 'A'..='Z'  => self.consume_ident(),
            '+' | '-' | '*' | '/'
                | '%' | '='              => self.consume_operator()?,
            COMMENT_OPEN                 => self.consume_comment()?,
            _ => {
                return Err(LexError::new(
                    LexErrorKind::IllegalCharacter(c),
                    Span::new(self.start_pos, c.len_utf8() as u32),
                ))
            }
        };

        trace!("{:?} {:?}", token.kind, token.span.fragment(self.source_code()));

        Ok(Some(token))
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Span from the start of the current token up to the cursor.
    fn make_span(&self) -> Span {
        Span::between(self.start_pos, self.cursor.offset())
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn make_text_token(&self, kind: TokenKind, text: &str) -> Token {
        Token::with_text(kind, text, self.make_span())
    }

    /// Advance past every character matching the predicate,
    /// returning the consumed text.
    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.cursor.offset();

        while matches!(self.cursor.current(), Some(c) if predicate(c)) {
            self.cursor.advance();
        }

        self.cursor.fragment_from(start)
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    fn consume_whitespace(&mut self) -> Token {
        let text = self.take_while(is_whitespace);
        self.make_text_token(TokenKind::Whitespace, text)
    }

    fn consume_integer(&mut self) -> Token {
        let text = self.take_while(is_digit);
        self.make_text_token(TokenKind::Integer, text)
    }

    fn consume_paren(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.make_token(kind)
    }

    /// Make a keyword or variable token.
    ///
    /// Keywords and variables share one character class, so the whole run
    /// is consumed before looking it up in the reserved words.
    fn consume_ident(&mut self) -> Token {
        let text = self.take_while(is_letter);

        match TokenKind::keyword(text) {
            Some(keyword) => self.make_token(keyword),
            None => self.make_text_token(TokenKind::Variable, text),
        }
    }

    /// Operators are single characters, but a run of them is consumed
    /// whole so that `+-` is rejected instead of split.
    fn consume_operator(&mut self) -> Result<Token, LexError> {
        let text = self.take_while(is_operator);

        let mut chars = text.chars();
        match (chars.next().and_then(TokenKind::operator), chars.next()) {
            (Some(kind), None) => Ok(self.make_token(kind)),
            _ => Err(LexError::new(
                LexErrorKind::IllegalOperator(text.into()),
                self.make_span(),
            )),
        }
    }

    /// Comment text excludes the braces, but the token span covers them.
    fn consume_comment(&mut self) -> Result<Token, LexError> {
        debug_assert_eq!(self.cursor.current(), Some(COMMENT_OPEN));
        self.cursor.advance();

        let text = self.take_while(|c| c != COMMENT_CLOSE);

        if !self.cursor.has_more() {
            return Err(LexError::new(
                LexErrorKind::UnterminatedComment,
                self.make_span(),
            ));
        }

        // Closing brace
        self.cursor.advance();

        Ok(self.make_text_token(TokenKind::Comment, text))
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_operator(c: char) -> bool {
    TokenKind::operator(c).is_some()
}

/// Lex the whole source, including whitespace and comment tokens.
pub fn tokenize(source_code: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source_code)?.into_iter().collect()
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Result<Token, LexError>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            error: None,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Iteration ends after the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    lexer: Lexer<'a>,
    /// Error found while lexing ahead, held back until
    /// the current token has been yielded.
    error: Option<LexError>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lexer.current.take() {
            Some(token) => {
                if let Err(err) = self.lexer.advance() {
                    self.lexer.current = None;
                    self.error = Some(err);
                }
                Some(Ok(token))
            }
            None => self.error.take().map(Err),
        }
    }
}

/// Spans hold `u32` offsets, so longer sources can't be addressed.
fn check_source_len(len: usize) -> Result<(), LexError> {
    if u32::try_from(len).is_err() {
        return Err(LexError::new(
            LexErrorKind::SourceTooLarge(len),
            Span::new(0, 0),
        ));
    }
    Ok(())
}

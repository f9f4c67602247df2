//! Recursive descent parser.
//!
//! Parsing and code generation happen in the same pass. Each production
//! calls into the [`CodeGenerator`] as soon as it is recognised, so no
//! syntax tree is ever built.
//!
//! ```text
//! program    := BEGIN block END
//! block      := { if | loop | break | print | read | assignment }
//! if         := (IFP | IFZ | IFN) expression block [ ELSE block ] END
//! loop       := LOOP block END
//! break      := BREAK
//! print      := PRINT expression
//! read       := READ variable
//! assignment := variable = expression
//! expression := term { (+ | -) term }
//! term       := signed { (* | / | %) factor }
//! signed     := [ + | - ] factor
//! factor     := integer | variable | ( expression )
//! ```
use log::{debug, trace};
use smol_str::SmolStr;

use crate::{
    codegen::{CodeGenerator, Condition, Operation},
    error::{BitsyError, BitsyResult, LexError, SyntaxError},
    lexer::Lexer,
    tokens::{KeywordClass, Span, Token, TokenKind},
};

/// Deepest nesting of blocks and parentheses accepted before giving up,
/// well within the stack of a spawned thread.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'a, G> {
    lexer: Lexer<'a>,
    generator: G,
    /// Current nesting of blocks and parenthesised expressions.
    depth: usize,
}

impl<'a, G: CodeGenerator> Parser<'a, G> {
    /// Prepare to parse, skipping any whitespace and comments
    /// before the first significant token.
    pub fn new(lexer: Lexer<'a>, generator: G) -> BitsyResult<Self> {
        let mut parser = Self {
            lexer,
            generator,
            depth: 0,
        };
        parser.skip_trivia()?;
        Ok(parser)
    }

    /// Parse the whole program, driving the generator.
    ///
    /// The generator is handed back on success so its output can be
    /// finalized. On failure the generator is dropped along with whatever
    /// partial output it holds.
    pub fn parse(mut self) -> BitsyResult<G> {
        debug!("parsing program");
        self.program()?;
        Ok(self.generator)
    }
}

/// Token stream helpers.
impl<'a, G: CodeGenerator> Parser<'a, G> {
    #[inline]
    fn current(&self) -> Option<&Token> {
        self.lexer.current()
    }

    #[inline]
    fn current_kind(&self) -> Option<TokenKind> {
        self.lexer.current().map(|token| token.kind)
    }

    /// Consumes whitespace and comment tokens until something else is reached.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        while matches!(self.current_kind(), Some(kind) if kind.is_skippable()) {
            self.lexer.advance()?;
        }
        Ok(())
    }

    /// Move to the next significant token.
    fn advance(&mut self) -> Result<(), LexError> {
        self.lexer.advance()?;
        self.skip_trivia()
    }

    /// Check the current token kind without advancing the cursor.
    fn expect(&self, kind: TokenKind) -> Result<&Token, SyntaxError> {
        match self.current() {
            Some(token) if token.kind == kind => Ok(token),
            _ => Err(self.mismatch(kind)),
        }
    }

    /// Return the text of the current token and advance the cursor.
    ///
    /// The current token must match the given kind, otherwise a syntax
    /// error is returned.
    fn match_token(&mut self, kind: TokenKind) -> BitsyResult<SmolStr> {
        let text = SmolStr::new(self.expect(kind)?.text());
        trace!("matched {kind:?} {text:?}");
        self.advance()?;
        Ok(text)
    }

    #[inline(never)]
    #[cold]
    fn mismatch(&self, expected: TokenKind) -> SyntaxError {
        SyntaxError {
            expected,
            found: self.current().cloned(),
            span: self.current_span(),
        }
    }

    /// Span of the current token, or an empty span at the end of the source.
    fn current_span(&self) -> Span {
        match self.current() {
            Some(token) => token.span,
            None => Span::new(self.lexer.source_code().len() as u32, 0),
        }
    }

    /// Step into a nested block or parenthesised expression.
    ///
    /// Errors abort the whole parse, so only successful
    /// productions need to call [`leave`](Self::leave).
    fn enter(&mut self) -> BitsyResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(BitsyError::NestingLimit {
                limit: MAX_DEPTH,
                span: self.current_span(),
            });
        }
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
    }
}

/// Productions.
impl<'a, G: CodeGenerator> Parser<'a, G> {
    fn program(&mut self) -> BitsyResult<()> {
        self.match_token(TokenKind::Begin)?;
        self.generator.header();

        self.block()?;

        // The closing END is checked but left in place.
        self.expect(TokenKind::End)?;
        self.generator.footer();

        Ok(())
    }

    fn block(&mut self) -> BitsyResult<()> {
        use TokenKind as TK;

        while let Some(kind) = self.current_kind() {
            if kind.is_block_end() {
                break;
            }

            match kind.classify() {
                KeywordClass::Conditional(cond) => self.if_statement(kind, cond)?,
                KeywordClass::Other => match kind {
                    TK::Loop => self.loop_statement()?,
                    TK::Break => self.break_statement()?,
                    TK::Print => self.print_statement()?,
                    TK::Read => self.read_statement()?,
                    _ => self.assignment()?,
                },
            }
        }

        Ok(())
    }

    fn if_statement(&mut self, keyword: TokenKind, cond: Condition) -> BitsyResult<()> {
        self.enter()?;
        self.match_token(keyword)?;
        self.expression()?;
        self.generator.start_cond(cond);

        self.block()?;

        if self.current_kind() == Some(TokenKind::Else) {
            self.match_token(TokenKind::Else)?;
            self.generator.else_cond();
            self.block()?;
        }

        self.match_token(TokenKind::End)?;
        self.generator.end_cond();
        self.leave();

        Ok(())
    }

    fn loop_statement(&mut self) -> BitsyResult<()> {
        self.enter()?;
        self.match_token(TokenKind::Loop)?;
        self.generator.loop_open();

        self.block()?;

        self.match_token(TokenKind::End)?;
        self.generator.loop_end();
        self.leave();

        Ok(())
    }

    fn break_statement(&mut self) -> BitsyResult<()> {
        self.match_token(TokenKind::Break)?;
        self.generator.break_loop();
        Ok(())
    }

    fn print_statement(&mut self) -> BitsyResult<()> {
        self.match_token(TokenKind::Print)?;
        self.expression()?;
        self.generator.print();
        Ok(())
    }

    fn read_statement(&mut self) -> BitsyResult<()> {
        self.match_token(TokenKind::Read)?;
        let name = self.match_token(TokenKind::Variable)?;
        self.generator.read(&name);
        Ok(())
    }

    fn assignment(&mut self) -> BitsyResult<()> {
        let name = self.match_token(TokenKind::Variable)?;
        self.match_token(TokenKind::Assignment)?;
        self.expression()?;
        self.generator.store_variable(&name);
        Ok(())
    }

    /// Sum of terms, left associative.
    ///
    /// The running value is pushed before the next term is evaluated
    /// into the register, then combined as `popped <op> register`.
    fn expression(&mut self) -> BitsyResult<()> {
        self.term()?;

        while let Some((kind, op)) = self.current_operator(TokenKind::additive_operation) {
            self.generator.push();
            self.match_token(kind)?;
            self.term()?;
            self.generator.pop_and_apply(op);
        }

        Ok(())
    }

    /// Product of factors, binding tighter than [`expression`](Self::expression).
    ///
    /// Only the first factor may carry a sign.
    fn term(&mut self) -> BitsyResult<()> {
        self.signed_factor()?;

        while let Some((kind, op)) = self.current_operator(TokenKind::multiplicative_operation) {
            self.generator.push();
            self.match_token(kind)?;
            self.factor()?;
            self.generator.pop_and_apply(op);
        }

        Ok(())
    }

    /// A leading minus negates the factor after it is loaded.
    /// A leading plus changes nothing.
    fn signed_factor(&mut self) -> BitsyResult<()> {
        let sign = self.current_operator(TokenKind::additive_operation);

        if let Some((kind, _)) = sign {
            self.match_token(kind)?;
        }

        self.factor()?;

        if let Some((_, Operation::Subtract)) = sign {
            self.generator.negate();
        }

        Ok(())
    }

    fn factor(&mut self) -> BitsyResult<()> {
        match self.current_kind() {
            Some(TokenKind::Integer) => {
                let value = self.match_token(TokenKind::Integer)?;
                self.generator.load_integer(&value);
            }
            Some(TokenKind::Variable) => {
                let name = self.match_token(TokenKind::Variable)?;
                self.generator.load_variable(&name);
            }
            _ => {
                self.enter()?;
                self.match_token(TokenKind::LeftParen)?;
                self.expression()?;
                self.match_token(TokenKind::RightParen)?;
                self.leave();
            }
        }

        Ok(())
    }

    /// Current token kind and its operation, if the given
    /// operator class recognises it.
    fn current_operator(
        &self,
        class: impl Fn(&TokenKind) -> Option<Operation>,
    ) -> Option<(TokenKind, Operation)> {
        let kind = self.current_kind()?;
        class(&kind).map(|op| (kind, op))
    }
}

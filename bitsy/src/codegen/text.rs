//! Backends that translate instructions into source code of another language.
use log::debug;

use super::{CodeGenerator, Condition, IntermediateBuilder, Operation};
use crate::{emit::Emitter, error::BitsyResult};

const INDENT: &str = "    ";

/// Spelling of each instruction in a target language.
///
/// Each method returns a single statement. The generator takes care of
/// indentation and line endings.
pub trait Dialect: IntermediateBuilder {
    /// Runtime support emitted before the first statement.
    fn header(&self) -> &'static str;

    fn footer(&self) -> &'static str;

    /// Nesting level of top level statements, for targets that
    /// wrap the program in an entry point function.
    fn body_depth(&self) -> usize {
        0
    }

    fn start_cond(&self, cond: Condition) -> String;
    fn else_cond(&self) -> &'static str;
    fn end_cond(&self) -> &'static str;
    fn loop_open(&self) -> &'static str;
    fn loop_end(&self) -> &'static str;
    fn break_loop(&self) -> &'static str;
    fn print(&self) -> &'static str;
    fn read(&self, name: &str) -> String;
    fn load_variable(&self, name: &str) -> String;
    fn load_integer(&self, value: &str) -> String;
    fn store_variable(&self, name: &str) -> String;
    fn push(&self) -> &'static str;
    fn pop_and_apply(&self, op: Operation) -> String;
    fn negate(&self) -> &'static str;
}

/// Code generator writing target language text through an [`Emitter`].
pub struct TextGenerator<D, E> {
    dialect: D,
    emitter: E,
    /// Current block nesting, for indentation.
    depth: usize,
}

impl<D: Dialect, E: Emitter> TextGenerator<D, E> {
    pub fn new(dialect: D, emitter: E) -> Self {
        Self {
            dialect,
            emitter,
            depth: 0,
        }
    }

    #[inline]
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    #[inline]
    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn into_emitter(self) -> E {
        self.emitter
    }

    /// Hand the generated code and the dialect's build
    /// details to the emitter.
    ///
    /// Must only be called once the whole program was parsed.
    pub fn finalize(mut self) -> BitsyResult<()> {
        debug!(
            "finalizing {} output",
            self.dialect.intermediate_extension()
        );
        self.emitter.finalize(&self.dialect)
    }

    fn emit_line(&mut self, code: &str) {
        let line = format!("{}{code}\n", INDENT.repeat(self.depth));
        self.emitter.emit(&line);
    }

    /// Emit verbatim text, like runtime support code.
    fn emit_text(&mut self, text: &str) {
        self.emitter.emit(text);
    }

    fn open(&mut self, code: &str) {
        self.emit_line(code);
        self.depth += 1;
    }

    fn close(&mut self, code: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.emit_line(code);
    }
}

impl<D: Dialect, E: Emitter> CodeGenerator for TextGenerator<D, E> {
    fn header(&mut self) {
        let header = self.dialect.header();
        self.emit_text(header);
        self.depth = self.dialect.body_depth();
    }

    fn footer(&mut self) {
        let footer = self.dialect.footer();
        self.depth = 0;
        self.emit_text(footer);
    }

    fn start_cond(&mut self, cond: Condition) {
        let code = self.dialect.start_cond(cond);
        self.open(&code);
    }

    fn else_cond(&mut self) {
        let code = self.dialect.else_cond();
        self.close(code);
        self.depth += 1;
    }

    fn end_cond(&mut self) {
        let code = self.dialect.end_cond();
        self.close(code);
    }

    fn loop_open(&mut self) {
        let code = self.dialect.loop_open();
        self.open(code);
    }

    fn loop_end(&mut self) {
        let code = self.dialect.loop_end();
        self.close(code);
    }

    fn break_loop(&mut self) {
        let code = self.dialect.break_loop();
        self.emit_line(code);
    }

    fn print(&mut self) {
        let code = self.dialect.print();
        self.emit_line(code);
    }

    fn read(&mut self, name: &str) {
        let code = self.dialect.read(name);
        self.emit_line(&code);
    }

    fn load_variable(&mut self, name: &str) {
        let code = self.dialect.load_variable(name);
        self.emit_line(&code);
    }

    fn load_integer(&mut self, value: &str) {
        let code = self.dialect.load_integer(value);
        self.emit_line(&code);
    }

    fn store_variable(&mut self, name: &str) {
        let code = self.dialect.store_variable(name);
        self.emit_line(&code);
    }

    fn push(&mut self) {
        let code = self.dialect.push();
        self.emit_line(code);
    }

    fn pop_and_apply(&mut self, op: Operation) {
        let code = self.dialect.pop_and_apply(op);
        self.emit_line(&code);
    }

    fn negate(&mut self) {
        let code = self.dialect.negate();
        self.emit_line(code);
    }
}

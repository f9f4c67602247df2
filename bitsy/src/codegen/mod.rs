//! Code generation.
//!
//! The parser speaks to a backend through [`CodeGenerator`], an instruction
//! set for a small abstract machine:
//!
//! - a single integer register,
//! - a stack of integers for intermediate results,
//! - named storage where variables that were never assigned read as zero.
//!
//! Backends are free to keep their own state, like label stacks, as long as
//! the program they produce behaves exactly like that machine.
mod bytecode;
mod rust;
mod swift;
mod text;

pub use self::{
    bytecode::{BytecodeGenerator, Op, Program},
    rust::RustDialect,
    swift::SwiftDialect,
    text::{Dialect, TextGenerator},
};

use std::fmt;

/// Arithmetic applied by [`CodeGenerator::pop_and_apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl Operation {
    #[rustfmt::skip]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add      => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide   => "/",
            Self::Modulus  => "%",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Register test of a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Positive,
    Negative,
    Zero,
}

impl Condition {
    /// Comparison operator against zero.
    #[rustfmt::skip]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Positive => ">",
            Self::Negative => "<",
            Self::Zero     => "==",
        }
    }

    pub fn test(&self, value: i64) -> bool {
        match self {
            Self::Positive => value > 0,
            Self::Negative => value < 0,
            Self::Zero => value == 0,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} 0", self.symbol())
    }
}

/// Instruction set every backend implements.
///
/// Calls arrive in program order as the parser recognises each production.
/// None of them report failure; a backend that can reject a program
/// collects the problem and surfaces it when its output is taken.
pub trait CodeGenerator {
    /// Start of program, before any other instruction.
    fn header(&mut self);

    /// End of program, after every other instruction.
    fn footer(&mut self);

    /// Open a block that runs when the register passes the condition.
    fn start_cond(&mut self, cond: Condition);

    /// Switch the open conditional to its alternative block.
    fn else_cond(&mut self);

    fn end_cond(&mut self);

    /// Open an unconditional loop.
    fn loop_open(&mut self);

    fn loop_end(&mut self);

    /// Leave the innermost loop.
    fn break_loop(&mut self);

    /// Write the register to the output.
    fn print(&mut self);

    /// Read an integer from the input into a variable.
    ///
    /// Input that isn't a number stores zero.
    fn read(&mut self, name: &str);

    fn load_variable(&mut self, name: &str);

    /// Load a decimal literal into the register.
    fn load_integer(&mut self, value: &str);

    /// Store the register into a variable.
    fn store_variable(&mut self, name: &str);

    /// Push the register onto the stack.
    fn push(&mut self);

    /// Pop the stack and combine it with the register as
    /// `popped <op> register`, leaving the result in the register.
    fn pop_and_apply(&mut self, op: Operation);

    fn negate(&mut self);
}

impl<G: CodeGenerator + ?Sized> CodeGenerator for &mut G {
    fn header(&mut self) {
        (**self).header()
    }

    fn footer(&mut self) {
        (**self).footer()
    }

    fn start_cond(&mut self, cond: Condition) {
        (**self).start_cond(cond)
    }

    fn else_cond(&mut self) {
        (**self).else_cond()
    }

    fn end_cond(&mut self) {
        (**self).end_cond()
    }

    fn loop_open(&mut self) {
        (**self).loop_open()
    }

    fn loop_end(&mut self) {
        (**self).loop_end()
    }

    fn break_loop(&mut self) {
        (**self).break_loop()
    }

    fn print(&mut self) {
        (**self).print()
    }

    fn read(&mut self, name: &str) {
        (**self).read(name)
    }

    fn load_variable(&mut self, name: &str) {
        (**self).load_variable(name)
    }

    fn load_integer(&mut self, value: &str) {
        (**self).load_integer(value)
    }

    fn store_variable(&mut self, name: &str) {
        (**self).store_variable(name)
    }

    fn push(&mut self) {
        (**self).push()
    }

    fn pop_and_apply(&mut self, op: Operation) {
        (**self).pop_and_apply(op)
    }

    fn negate(&mut self) {
        (**self).negate()
    }
}

impl<G: CodeGenerator + ?Sized> CodeGenerator for Box<G> {
    fn header(&mut self) {
        (**self).header()
    }

    fn footer(&mut self) {
        (**self).footer()
    }

    fn start_cond(&mut self, cond: Condition) {
        (**self).start_cond(cond)
    }

    fn else_cond(&mut self) {
        (**self).else_cond()
    }

    fn end_cond(&mut self) {
        (**self).end_cond()
    }

    fn loop_open(&mut self) {
        (**self).loop_open()
    }

    fn loop_end(&mut self) {
        (**self).loop_end()
    }

    fn break_loop(&mut self) {
        (**self).break_loop()
    }

    fn print(&mut self) {
        (**self).print()
    }

    fn read(&mut self, name: &str) {
        (**self).read(name)
    }

    fn load_variable(&mut self, name: &str) {
        (**self).load_variable(name)
    }

    fn load_integer(&mut self, value: &str) {
        (**self).load_integer(value)
    }

    fn store_variable(&mut self, name: &str) {
        (**self).store_variable(name)
    }

    fn push(&mut self) {
        (**self).push()
    }

    fn pop_and_apply(&mut self, op: Operation) {
        (**self).pop_and_apply(op)
    }

    fn negate(&mut self) {
        (**self).negate()
    }
}

/// Build details of a backend whose output is source for another toolchain.
pub trait IntermediateBuilder {
    /// File extension of the intermediate source, including the dot.
    fn intermediate_extension(&self) -> &'static str;

    /// Shell command that turns the intermediate source
    /// into an executable at `final_path`.
    fn build_command(&self, final_path: &str) -> String;

    fn intermediate_path(&self, final_path: &str) -> String {
        format!("{final_path}{}", self.intermediate_extension())
    }
}

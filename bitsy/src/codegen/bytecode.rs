//! Bytecode backend, executed in process by [`Machine`](crate::vm::Machine).
use std::fmt;

use log::trace;
use smol_str::SmolStr;

use super::{CodeGenerator, Condition, Operation};
use crate::error::{BitsyResult, CodegenError};

/// Jump target of a jump that hasn't been patched yet.
const PENDING: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Load a constant into the register.
    Load(i64),
    /// Load a variable into the register.
    LoadVar(SmolStr),
    /// Store the register into a variable.
    Store(SmolStr),
    /// Read an integer from input into a variable.
    Read(SmolStr),
    Print,
    Push,
    /// Pop the stack and apply the operation with the register.
    Apply(Operation),
    Negate,
    /// Jump to the op index unless the register passes the condition.
    JumpUnless(Condition, usize),
    Jump(usize),
    Halt,
}

impl fmt::Display for Op {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Load(value)              => write!(f, "LOAD   {value}"),
            Self::LoadVar(name)            => write!(f, "LOADV  {name}"),
            Self::Store(name)              => write!(f, "STORE  {name}"),
            Self::Read(name)               => write!(f, "READ   {name}"),
            Self::Print                    => write!(f, "PRINT"),
            Self::Push                     => write!(f, "PUSH"),
            Self::Apply(op)                => write!(f, "POP    {op}"),
            Self::Negate                   => write!(f, "NEG"),
            Self::JumpUnless(cond, target) => write!(f, "JPNOT  {cond}, {target:04}"),
            Self::Jump(target)             => write!(f, "JP     {target:04}"),
            Self::Halt                     => write!(f, "HALT"),
        }
    }
}

/// Compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
}

impl Program {
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Disassembly listing, one instruction per line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, op) in self.ops.iter().enumerate() {
            writeln!(f, "{index:04}: {op}")?;
        }
        Ok(())
    }
}

/// Loop under construction.
struct LoopFrame {
    /// Index of the first op in the loop body.
    start: usize,
    /// Jumps out of the loop awaiting the end address.
    breaks: Vec<usize>,
}

/// Code generator producing a [`Program`].
///
/// Forward jumps are emitted with a pending target and patched once the
/// end of their block is known.
#[derive(Default)]
pub struct BytecodeGenerator {
    ops: Vec<Op>,
    /// Open conditionals, holding the index of the jump awaiting a target.
    conds: Vec<usize>,
    loops: Vec<LoopFrame>,
    /// First problem encountered, reported by `finish`.
    error: Option<CodegenError>,
}

impl BytecodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the compiled program.
    pub fn finish(self) -> BitsyResult<Program> {
        if let Some(err) = self.error {
            return Err(err.into());
        }

        if !self.conds.is_empty() {
            return Err(CodegenError::Unbalanced("conditional left open").into());
        }

        if !self.loops.is_empty() {
            return Err(CodegenError::Unbalanced("loop left open").into());
        }

        Ok(Program { ops: self.ops })
    }

    fn emit(&mut self, op: Op) -> usize {
        trace!("{:04}: {}", self.ops.len(), op);
        self.ops.push(op);
        self.ops.len() - 1
    }

    /// Point the jump at the given index to the next op to be emitted.
    fn patch(&mut self, at: usize) {
        let next = self.ops.len();
        match &mut self.ops[at] {
            Op::Jump(target) | Op::JumpUnless(_, target) => *target = next,
            op => debug_assert!(false, "patching non-jump op {op}"),
        }
    }

    fn fail(&mut self, err: CodegenError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl CodeGenerator for BytecodeGenerator {
    fn header(&mut self) {
        self.ops.clear();
        self.conds.clear();
        self.loops.clear();
    }

    fn footer(&mut self) {
        self.emit(Op::Halt);
    }

    fn start_cond(&mut self, cond: Condition) {
        let jump = self.emit(Op::JumpUnless(cond, PENDING));
        self.conds.push(jump);
    }

    fn else_cond(&mut self) {
        match self.conds.pop() {
            Some(skip_then) => {
                // The then-block jumps over the else-block.
                let skip_else = self.emit(Op::Jump(PENDING));
                self.patch(skip_then);
                self.conds.push(skip_else);
            }
            None => self.fail(CodegenError::Unbalanced("else without conditional")),
        }
    }

    fn end_cond(&mut self) {
        match self.conds.pop() {
            Some(jump) => self.patch(jump),
            None => self.fail(CodegenError::Unbalanced("end of conditional without start")),
        }
    }

    fn loop_open(&mut self) {
        self.loops.push(LoopFrame {
            start: self.ops.len(),
            breaks: vec![],
        });
    }

    fn loop_end(&mut self) {
        match self.loops.pop() {
            Some(frame) => {
                self.emit(Op::Jump(frame.start));
                for jump in frame.breaks {
                    self.patch(jump);
                }
            }
            None => self.fail(CodegenError::Unbalanced("end of loop without start")),
        }
    }

    fn break_loop(&mut self) {
        if self.loops.is_empty() {
            self.fail(CodegenError::BreakOutsideLoop);
            return;
        }

        let jump = self.emit(Op::Jump(PENDING));
        if let Some(frame) = self.loops.last_mut() {
            frame.breaks.push(jump);
        }
    }

    fn print(&mut self) {
        self.emit(Op::Print);
    }

    fn read(&mut self, name: &str) {
        self.emit(Op::Read(name.into()));
    }

    fn load_variable(&mut self, name: &str) {
        self.emit(Op::LoadVar(name.into()));
    }

    fn load_integer(&mut self, value: &str) {
        match value.parse::<i64>() {
            Ok(value) => {
                self.emit(Op::Load(value));
            }
            Err(_) => self.fail(CodegenError::IntegerOverflow(value.into())),
        }
    }

    fn store_variable(&mut self, name: &str) {
        self.emit(Op::Store(name.into()));
    }

    fn push(&mut self) {
        self.emit(Op::Push);
    }

    fn pop_and_apply(&mut self, op: Operation) {
        self.emit(Op::Apply(op));
    }

    fn negate(&mut self) {
        self.emit(Op::Negate);
    }
}

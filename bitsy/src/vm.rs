//! Virtual machine.
use std::{
    collections::HashMap,
    io::{BufRead, Write},
};

use smol_str::SmolStr;

use crate::{
    codegen::{Op, Operation, Program},
    error::{BitsyResult, RuntimeError},
};

/// Variable storage. Variables that were never assigned read as zero.
#[derive(Debug, Default, Clone)]
pub struct Storage {
    values: HashMap<SmolStr, i64>,
}

impl Storage {
    #[inline]
    pub fn get(&self, name: &str) -> i64 {
        self.values.get(name).copied().unwrap_or(0)
    }

    #[inline]
    pub fn set(&mut self, name: impl Into<SmolStr>, value: i64) {
        self.values.insert(name.into(), value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program ran to completion.
    Halt,
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
pub struct VmConf {
    /// Maximum number of instructions `execute` may run before giving up.
    ///
    /// `None` runs until the program halts.
    pub step_limit: Option<usize>,
}

/// Executes a compiled [`Program`] against an input and an output stream.
pub struct Machine<'p, R, W> {
    program: &'p Program,
    /// Program counter, index into the program's ops.
    pc: usize,
    register: i64,
    stack: Vec<i64>,
    storage: Storage,
    input: R,
    output: W,
    conf: VmConf,
}

impl<'p, R: BufRead, W: Write> Machine<'p, R, W> {
    pub fn new(conf: VmConf, program: &'p Program, input: R, output: W) -> Self {
        Self {
            program,
            pc: 0,
            register: 0,
            stack: vec![],
            storage: Storage::default(),
            input,
            output,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &VmConf {
        &self.conf
    }

    #[inline]
    pub fn register(&self) -> i64 {
        self.register
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Reset the machine state so the program runs from the start.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.register = 0;
        self.stack.clear();
        self.storage.clear();
    }

    /// Run the program from the start until it halts.
    pub fn execute(&mut self) -> BitsyResult<()> {
        self.reset();

        let mut steps = 0_usize;
        loop {
            if let Some(limit) = self.conf.step_limit {
                if steps >= limit {
                    return Err(RuntimeError::StepLimit(limit).into());
                }
            }

            if self.step()? == Flow::Halt {
                break;
            }
            steps += 1;
        }

        self.output.flush()?;

        Ok(())
    }

    /// Run the program from the start for at most the given number of steps.
    pub fn run_steps(&mut self, step_count: usize) -> BitsyResult<Flow> {
        self.reset();

        for _ in 0..step_count {
            if self.step()? == Flow::Halt {
                self.output.flush()?;
                return Ok(Flow::Halt);
            }
        }

        self.output.flush()?;

        Ok(Flow::Ok)
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> BitsyResult<Flow> {
        let program = self.program;

        // Running off the end is the same as halting.
        let op = match program.ops().get(self.pc) {
            Some(op) => op,
            None => return Ok(Flow::Halt),
        };

        #[cfg(feature = "op_trace")]
        log::trace!("{:04}: {} ; register = {}", self.pc, op, self.register);

        self.pc += 1;

        match op {
            Op::Load(value) => self.register = *value,
            Op::LoadVar(name) => self.register = self.storage.get(name),
            Op::Store(name) => self.storage.set(name.clone(), self.register),
            Op::Read(name) => {
                let value = self.read_integer()?;
                self.storage.set(name.clone(), value);
            }
            Op::Print => writeln!(self.output, "{}", self.register)?,
            Op::Push => self.stack.push(self.register),
            Op::Apply(op) => {
                let lhs = self.stack.pop().ok_or(RuntimeError::StackUnderflow)?;
                self.register = apply(*op, lhs, self.register)?;
            }
            Op::Negate => self.register = self.register.wrapping_neg(),
            Op::JumpUnless(cond, target) => {
                if !cond.test(self.register) {
                    self.pc = *target;
                }
            }
            Op::Jump(target) => self.pc = *target,
            Op::Halt => return Ok(Flow::Halt),
        }

        Ok(Flow::Ok)
    }

    /// Read one line of input as an integer.
    ///
    /// Input that isn't a number, including end of input, reads as zero.
    fn read_integer(&mut self) -> BitsyResult<i64> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().parse().unwrap_or(0))
    }
}

/// Arithmetic of the abstract machine: `lhs <op> rhs`, wrapping on overflow.
pub fn apply(op: Operation, lhs: i64, rhs: i64) -> Result<i64, RuntimeError> {
    match op {
        Operation::Add => Ok(lhs.wrapping_add(rhs)),
        Operation::Subtract => Ok(lhs.wrapping_sub(rhs)),
        Operation::Multiply => Ok(lhs.wrapping_mul(rhs)),
        Operation::Divide | Operation::Modulus if rhs == 0 => Err(RuntimeError::DivisionByZero),
        Operation::Divide => Ok(lhs.wrapping_div(rhs)),
        Operation::Modulus => Ok(lhs.wrapping_rem(rhs)),
    }
}

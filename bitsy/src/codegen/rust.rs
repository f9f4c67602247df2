//! Rust backend.
use super::{Condition, Dialect, IntermediateBuilder, Operation};

const HEADER: &str = r#"// Compiler output
#![allow(dead_code, unused_mut, unused_variables, unused_assignments, unreachable_code)]

use std::collections::HashMap;
use std::io::BufRead;

/// Variable storage. Variables that were never assigned read as zero.
#[derive(Default)]
struct Variables {
    values: HashMap<&'static str, i64>,
}

impl Variables {
    fn get(&self, name: &str) -> i64 {
        self.values.get(name).copied().unwrap_or(0)
    }

    fn set(&mut self, name: &'static str, value: i64) {
        self.values.insert(name, value);
    }
}

/// Read one line of input as an integer, zero when it isn't one.
fn read_in(input: &mut impl BufRead) -> i64 {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => line.trim().parse().unwrap_or(0),
        Err(_) => 0,
    }
}

fn main() {
    let mut register: i64 = 0;
    let mut variables = Variables::default();
    let mut stack: Vec<i64> = Vec::new();
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

"#;

const FOOTER: &str = "}

// End compiler output
";

/// Emits a standalone Rust program, built with `rustc`.
///
/// Arithmetic wraps on overflow. Division by zero panics
/// in the compiled program.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustDialect;

impl IntermediateBuilder for RustDialect {
    fn intermediate_extension(&self) -> &'static str {
        ".rs"
    }

    fn build_command(&self, final_path: &str) -> String {
        format!(
            "rustc -O -A warnings {} -o {final_path}",
            self.intermediate_path(final_path)
        )
    }
}

#[rustfmt::skip]
impl Dialect for RustDialect {
    fn header(&self) -> &'static str { HEADER }
    fn footer(&self) -> &'static str { FOOTER }
    fn body_depth(&self) -> usize { 1 }

    fn start_cond(&self, cond: Condition) -> String {
        format!("if register {} 0 {{", cond.symbol())
    }

    fn else_cond(&self) -> &'static str  { "} else {" }
    fn end_cond(&self) -> &'static str   { "}" }
    fn loop_open(&self) -> &'static str  { "loop {" }
    fn loop_end(&self) -> &'static str   { "}" }
    fn break_loop(&self) -> &'static str { "break;" }
    fn print(&self) -> &'static str      { "println!(\"{}\", register);" }

    fn read(&self, name: &str) -> String {
        format!("variables.set(\"{name}\", read_in(&mut input));")
    }

    fn load_variable(&self, name: &str) -> String {
        format!("register = variables.get(\"{name}\");")
    }

    fn load_integer(&self, value: &str) -> String {
        format!("register = {value};")
    }

    fn store_variable(&self, name: &str) -> String {
        format!("variables.set(\"{name}\", register);")
    }

    fn push(&self) -> &'static str { "stack.push(register);" }

    fn pop_and_apply(&self, op: Operation) -> String {
        let method = match op {
            Operation::Add      => "wrapping_add",
            Operation::Subtract => "wrapping_sub",
            Operation::Multiply => "wrapping_mul",
            Operation::Divide   => "wrapping_div",
            Operation::Modulus  => "wrapping_rem",
        };
        format!("register = stack.pop().unwrap_or(0).{method}(register);")
    }

    fn negate(&self) -> &'static str { "register = register.wrapping_neg();" }
}

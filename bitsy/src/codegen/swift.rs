//! Swift backend.
use super::{Condition, Dialect, IntermediateBuilder, Operation};

const HEADER: &str = r#"// Compiler Output

struct Variables {
    private var values: [String: Int] = [:]
    subscript(index: String) -> Int {
        get { guard let v = values[index] else { return 0 }; return v }
        set (newValue) { values[index] = newValue }
    }
}
var register: Int = 0
var variables = Variables()
var stack: [Int] = []
func readIn() -> Int {
    if let input = readLine(), let intInput = Int(input) {
        return intInput
    } else {
        return 0
    }
}

"#;

const FOOTER: &str = "
// End Compiler Output
";

/// Emits a Swift script, built with `swiftc`.
///
/// Swift traps on arithmetic overflow instead of wrapping, so the
/// overflowing operators (`&+`, `&-`, `&*`) are used for those.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwiftDialect;

impl IntermediateBuilder for SwiftDialect {
    fn intermediate_extension(&self) -> &'static str {
        ".swift"
    }

    fn build_command(&self, final_path: &str) -> String {
        format!(
            "swiftc {} -o {final_path} -suppress-warnings",
            self.intermediate_path(final_path)
        )
    }
}

#[rustfmt::skip]
impl Dialect for SwiftDialect {
    fn header(&self) -> &'static str { HEADER }
    fn footer(&self) -> &'static str { FOOTER }

    fn start_cond(&self, cond: Condition) -> String {
        format!("if register {} 0 {{", cond.symbol())
    }

    fn else_cond(&self) -> &'static str  { "} else {" }
    fn end_cond(&self) -> &'static str   { "}" }
    fn loop_open(&self) -> &'static str  { "while true {" }
    fn loop_end(&self) -> &'static str   { "}" }
    fn break_loop(&self) -> &'static str { "break" }
    fn print(&self) -> &'static str      { "print(register)" }

    fn read(&self, name: &str) -> String {
        format!("variables[\"{name}\"] = readIn()")
    }

    fn load_variable(&self, name: &str) -> String {
        format!("register = variables[\"{name}\"]")
    }

    fn load_integer(&self, value: &str) -> String {
        format!("register = {value}")
    }

    fn store_variable(&self, name: &str) -> String {
        format!("variables[\"{name}\"] = register")
    }

    fn push(&self) -> &'static str { "stack.append(register)" }

    fn pop_and_apply(&self, op: Operation) -> String {
        let symbol = match op {
            Operation::Add      => "&+",
            Operation::Subtract => "&-",
            Operation::Multiply => "&*",
            Operation::Divide   => "/",
            Operation::Modulus  => "%",
        };
        format!("register = stack.removeLast() {symbol} register")
    }

    fn negate(&self) -> &'static str { "register = 0 &- register" }
}

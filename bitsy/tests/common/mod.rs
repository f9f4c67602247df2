use bitsy::codegen::{CodeGenerator, Condition, Operation};

/// Generator that writes down every instruction it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<String>,
}

impl Recorder {
    fn record(&mut self, call: impl ToString) {
        self.calls.push(call.to_string());
    }
}

impl CodeGenerator for Recorder {
    fn header(&mut self) {
        self.record("header");
    }

    fn footer(&mut self) {
        self.record("footer");
    }

    fn start_cond(&mut self, cond: Condition) {
        self.record(format!("start_cond {cond}"));
    }

    fn else_cond(&mut self) {
        self.record("else_cond");
    }

    fn end_cond(&mut self) {
        self.record("end_cond");
    }

    fn loop_open(&mut self) {
        self.record("loop_open");
    }

    fn loop_end(&mut self) {
        self.record("loop_end");
    }

    fn break_loop(&mut self) {
        self.record("break_loop");
    }

    fn print(&mut self) {
        self.record("print");
    }

    fn read(&mut self, name: &str) {
        self.record(format!("read {name}"));
    }

    fn load_variable(&mut self, name: &str) {
        self.record(format!("load_variable {name}"));
    }

    fn load_integer(&mut self, value: &str) {
        self.record(format!("load_integer {value}"));
    }

    fn store_variable(&mut self, name: &str) {
        self.record(format!("store_variable {name}"));
    }

    fn push(&mut self) {
        self.record("push");
    }

    fn pop_and_apply(&mut self, op: Operation) {
        self.record(format!("pop_and_apply {op}"));
    }

    fn negate(&mut self) {
        self.record("negate");
    }
}

/// Instructions the parser issued for the source.
#[allow(dead_code)]
pub fn record(source: &str) -> Vec<String> {
    match bitsy::compile_str(source, Recorder::default()) {
        Ok(recorder) => recorder.calls,
        Err(err) => panic!("{}", err),
    }
}

use bitsy::{prelude::*, vm::Flow, CodegenError, RuntimeError};

fn run_with(conf: VmConf, source: &str, input: &str) -> BitsyResult<String> {
    let program = bitsy::assemble(source)?;
    let mut machine = Machine::new(conf, &program, input.as_bytes(), Vec::new());
    machine.execute()?;
    Ok(String::from_utf8_lossy(&machine.into_output()).into_owned())
}

fn run(source: &str, input: &str) -> String {
    match run_with(VmConf::default(), source, input) {
        Ok(output) => output,
        Err(err) => panic!("{}", err),
    }
}

fn print(expression: &str) -> String {
    run(&format!("BEGIN PRINT {expression} END"), "")
}

#[test]
fn test_precedence() {
    assert_eq!(print("2 + 3 * 4"), "14\n");
    assert_eq!(print("(2 + 3) * 4"), "20\n");
    assert_eq!(print("2 * 3 + 4 * 5"), "26\n");
}

#[test]
fn test_left_associative() {
    assert_eq!(print("10 - 3 - 2"), "5\n");
    assert_eq!(print("100 / 10 / 5"), "2\n");
    assert_eq!(print("17 % 10 % 4"), "3\n");
}

#[test]
fn test_unary_sign() {
    assert_eq!(print("-5"), "-5\n");
    assert_eq!(print("-(2 + 3)"), "-5\n");
    assert_eq!(print("+7"), "7\n");
    assert_eq!(print("1 - -3"), "4\n");
}

#[test]
fn test_truncating_division() {
    assert_eq!(print("-7 / 2"), "-3\n");
    assert_eq!(print("-7 % 3"), "-1\n");
}

#[test]
fn test_wrapping_arithmetic() {
    assert_eq!(print("9223372036854775807 + 1"), "-9223372036854775808\n");
}

#[test]
fn test_unassigned_variable_is_zero() {
    assert_eq!(print("x"), "0\n");
    assert_eq!(run("BEGIN x = x + 1 x = x + 1 PRINT x END", ""), "2\n");
}

#[test]
fn test_read() {
    let source = "BEGIN READ a READ b PRINT a * b END";
    assert_eq!(run(source, "6\n7\n"), "42\n");
    assert_eq!(run(source, "  6  \nseven\n"), "0\n");
    assert_eq!(run(source, ""), "0\n");
}

#[test]
fn test_conditions_fixture() {
    assert_eq!(
        run(include_str!("../programs/conditions.bitsy"), ""),
        "1\n3\n5\n6\n"
    );
}

#[test]
fn test_fibonacci_fixture() {
    assert_eq!(
        run(include_str!("../programs/fibonacci.bitsy"), ""),
        "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n55\n89\n"
    );
}

#[test]
fn test_factorial_fixture() {
    let source = include_str!("../programs/factorial.bitsy");
    assert_eq!(run(source, "5\n"), "120\n");
    assert_eq!(run(source, "not a number\n"), "1\n");
}

#[test]
fn test_nested_break_leaves_inner_loop() {
    let source = "
        BEGIN
            i = 3
            LOOP
                IFZ i BREAK END
                LOOP BREAK PRINT 99 END
                PRINT i
                i = i - 1
            END
        END";
    assert_eq!(run(source, ""), "3\n2\n1\n");
}

#[test]
fn test_division_by_zero() {
    let result = run_with(VmConf::default(), "BEGIN PRINT 1 / 0 END", "");
    match result {
        Err(BitsyError::Runtime(RuntimeError::DivisionByZero)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_step_limit() {
    let conf = VmConf {
        step_limit: Some(100),
    };
    let result = run_with(conf, "BEGIN LOOP END END", "");
    match result {
        Err(err @ BitsyError::Runtime(RuntimeError::StepLimit(100))) => {
            assert_eq!(err.exit_code(), bitsy::sysexits::EX_SOFTWARE);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_run_steps() {
    let program = bitsy::assemble("BEGIN PRINT 1 PRINT 2 END").unwrap();
    let mut output = Vec::new();

    {
        let mut machine = Machine::new(VmConf::default(), &program, &b""[..], &mut output);
        assert_eq!(machine.run_steps(2).unwrap(), Flow::Ok);
        assert_eq!(machine.register(), 1);
        assert_eq!(machine.run_steps(10).unwrap(), Flow::Halt);
    }

    // Each run starts over from the first instruction.
    assert_eq!(String::from_utf8(output).unwrap(), "1\n1\n2\n");
}

#[test]
fn test_storage_after_run() {
    let program = bitsy::assemble("BEGIN a = 4 b = a * a END").unwrap();
    let mut machine = Machine::new(VmConf::default(), &program, &b""[..], Vec::new());
    machine.execute().unwrap();
    assert_eq!(machine.storage().get("b"), 16);
    assert_eq!(machine.register(), 16);
}

#[test]
fn test_break_outside_loop_rejected() {
    match bitsy::assemble("BEGIN BREAK END") {
        Err(BitsyError::Codegen(CodegenError::BreakOutsideLoop)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

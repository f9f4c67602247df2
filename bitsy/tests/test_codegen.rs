use std::{
    fs,
    process::{Command, Stdio},
};

use bitsy::{codegen::IntermediateBuilder, prelude::*};

fn translate<D: bitsy::codegen::Dialect>(dialect: D, source: &str) -> String {
    let generator = TextGenerator::new(dialect, BufferEmitter::new());
    match bitsy::compile_str(source, generator) {
        Ok(generator) => generator.into_emitter().into_string(),
        Err(err) => panic!("{}", err),
    }
}

#[test]
fn test_rust_output() {
    let code = translate(RustDialect, "BEGIN IFP x - 1 PRINT 1 END END");

    let body = concat!(
        "    register = variables.get(\"x\");\n",
        "    stack.push(register);\n",
        "    register = 1;\n",
        "    register = stack.pop().unwrap_or(0).wrapping_sub(register);\n",
        "    if register > 0 {\n",
        "        register = 1;\n",
        "        println!(\"{}\", register);\n",
        "    }\n",
        "}\n",
        "\n",
        "// End compiler output\n",
    );

    assert!(code.starts_with("// Compiler output\n"));
    assert!(code.ends_with(body), "unexpected output:\n{code}");

    let main = code.find("fn main() {").unwrap();
    assert!(main < code.len() - body.len());
}

#[test]
fn test_swift_output() {
    let code = translate(
        SwiftDialect,
        "BEGIN LOOP READ n IFZ n BREAK ELSE PRINT -n END END END",
    );

    let body = concat!(
        "while true {\n",
        "    variables[\"n\"] = readIn()\n",
        "    register = variables[\"n\"]\n",
        "    if register == 0 {\n",
        "        break\n",
        "    } else {\n",
        "        register = variables[\"n\"]\n",
        "        register = 0 &- register\n",
        "        print(register)\n",
        "    }\n",
        "}\n",
        "\n",
        "// End Compiler Output\n",
    );

    assert!(code.starts_with("// Compiler Output\n"));
    assert!(code.ends_with(body), "unexpected output:\n{code}");
}

#[test]
fn test_no_output_after_error() {
    let generator = TextGenerator::new(RustDialect, BufferEmitter::new());
    assert!(bitsy::compile_str("BEGIN PRINT ( END", generator).is_err());
}

#[test]
fn test_build_commands() {
    assert_eq!(RustDialect.intermediate_path("b.out"), "b.out.rs");
    assert_eq!(
        RustDialect.build_command("b.out"),
        "rustc -O -A warnings b.out.rs -o b.out"
    );
    assert_eq!(SwiftDialect.intermediate_path("b.out"), "b.out.swift");
    assert_eq!(
        SwiftDialect.build_command("b.out"),
        "swiftc b.out.swift -o b.out -suppress-warnings"
    );
}

/// Builds by running an arbitrary shell command over a `.txt` intermediate.
struct ShellBuilder(&'static str);

impl IntermediateBuilder for ShellBuilder {
    fn intermediate_extension(&self) -> &'static str {
        ".txt"
    }

    fn build_command(&self, final_path: &str) -> String {
        self.0
            .replace("{intermediate}", &self.intermediate_path(final_path))
            .replace("{final}", final_path)
    }
}

#[cfg(unix)]
#[test]
fn test_file_emitter_retains_intermediate() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out").display().to_string();

    let mut emitter = FileEmitter::new(final_path.as_str()).retain_intermediate(true);
    emitter.emit("hello ");
    emitter.emit("world\n");
    emitter
        .finalize(&ShellBuilder("cat {intermediate} > {final}"))
        .unwrap();

    let intermediate = format!("{final_path}.txt");
    assert_eq!(fs::read_to_string(&intermediate).unwrap(), "hello world\n");
    assert_eq!(fs::read_to_string(&final_path).unwrap(), "hello world\n");
}

#[cfg(unix)]
#[test]
fn test_file_emitter_deletes_intermediate() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out").display().to_string();

    let mut emitter = FileEmitter::new(final_path.as_str());
    emitter.emit("code");
    emitter
        .finalize(&ShellBuilder("cat {intermediate} > {final}"))
        .unwrap();

    assert!(!dir.path().join("out.txt").exists());
    assert!(dir.path().join("out").exists());
}

#[cfg(unix)]
#[test]
fn test_file_emitter_build_failure() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out").display().to_string();

    let mut emitter = FileEmitter::new(final_path.as_str());
    emitter.emit("code");
    let result = emitter.finalize(&ShellBuilder("exit 3"));

    match result {
        Err(err @ BitsyError::Build { status: Some(3), .. }) => {
            assert_eq!(err.exit_code(), bitsy::sysexits::EX_SOFTWARE);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!dir.path().join("out.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_file_emitter_runs_and_deletes_binary() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out").display().to_string();

    let mut emitter = FileEmitter::new(final_path.as_str()).run_binary(true);
    emitter.emit("#!/bin/sh\necho ran\n");
    emitter
        .finalize(&ShellBuilder("cp {intermediate} {final} && chmod +x {final}"))
        .unwrap();

    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("out.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_file_emitter_deletes_binary_after_failed_run() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("out").display().to_string();

    let mut emitter = FileEmitter::new(final_path.as_str()).run_binary(true);
    emitter.emit("#!/bin/sh\necho ran\nexit 101\n");
    let result = emitter.finalize(&ShellBuilder("cp {intermediate} {final} && chmod +x {final}"));

    match result {
        Err(err @ BitsyError::Run { status: Some(101), .. }) => {
            assert_eq!(err.exit_code(), bitsy::sysexits::EX_SOFTWARE);
            assert!(err.to_string().contains("exited with status 101"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("out.txt").exists());
}

#[cfg(unix)]
fn rustc_available() -> bool {
    Command::new("rustc")
        .arg("--version")
        .stdout(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// The built Rust program prints the same as the bytecode machine.
#[cfg(unix)]
#[test]
fn test_rust_build_matches_interpreter() {
    if !rustc_available() {
        eprintln!("rustc not found, skipping");
        return;
    }

    let source = concat!(
        "BEGIN\n",
        "    a = 0 b = 1\n",
        "    LOOP IFP a - 100 BREAK END PRINT a t = a + b a = b b = t END\n",
        "    PRINT 10 - 3 - 2\n",
        "    PRINT 2 + 3 * 4\n",
        "    PRINT -(2 + 3)\n",
        "    PRINT unset\n",
        "    READ n PRINT n\n",
        "    PRINT 9223372036854775807 + 1\n",
        "    PRINT -7 % 3\n",
        "    x = 3 - 5\n",
        "    IFN x PRINT 1 ELSE PRINT 2 END\n",
        "    IFZ x + 2 PRINT 3 END\n",
        "END\n",
    );

    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("prog");
    let emitter = FileEmitter::new(final_path.display().to_string());
    bitsy::compile_str(source, TextGenerator::new(RustDialect, emitter))
        .unwrap()
        .finalize()
        .unwrap();

    let output = Command::new(&final_path)
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success());

    let program = bitsy::assemble(source).unwrap();
    let mut machine = Machine::new(VmConf::default(), &program, &b""[..], Vec::new());
    machine.execute().unwrap();

    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&machine.into_output())
    );
}

#[test]
fn test_file_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.bitsy");
    fs::write(&path, "BEGIN PRINT 1 END\n").unwrap();

    let mut reader = FileReader::new(&path);
    assert_eq!(reader.read_code().unwrap(), "BEGIN PRINT 1 END\n");

    let mut missing = FileReader::new(dir.path().join("missing.bitsy"));
    match missing.read_code() {
        Err(err @ BitsyError::NoInput(_)) => {
            assert_eq!(err.exit_code(), bitsy::sysexits::EX_NOINPUT);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

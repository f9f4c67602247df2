pub mod codegen;
pub mod cursor;
pub mod emit;
mod error;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod tokens;
pub mod vm;

pub use self::error::{
    sysexits, BitsyError, BitsyResult, CodegenError, Diagnostic, LexError, LexErrorKind,
    RuntimeError, SyntaxError,
};

use self::{
    codegen::{BytecodeGenerator, CodeGenerator, Program},
    lexer::Lexer,
    parser::Parser,
};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse the source, driving the given generator, and hand it back.
pub fn compile_str<G: CodeGenerator>(source_code: &str, generator: G) -> BitsyResult<G> {
    let lexer = Lexer::new(source_code)?;
    Parser::new(lexer, generator)?.parse()
}

/// Compile source code to bytecode for the [`Machine`](vm::Machine).
pub fn assemble(source_code: &str) -> BitsyResult<Program> {
    compile_str(source_code, BytecodeGenerator::new())?.finish()
}

pub mod prelude {
    pub use super::{
        codegen::{
            BytecodeGenerator, CodeGenerator, Program, RustDialect, SwiftDialect, TextGenerator,
        },
        emit::{BufferEmitter, ConsoleEmitter, Emitter, FileEmitter},
        error::{BitsyError, BitsyResult, Diagnostic},
        source::{CodeReader, ConsoleReader, FileReader},
        vm::{Machine, VmConf},
    };
}

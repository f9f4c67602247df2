//! Entrypoint for CLI
use std::{io, process, time::Instant};

use bitsy::{lexer::Lexer, prelude::*, sysexits};
use clap::{error::ErrorKind, Parser};
use log::{info, LevelFilter};

mod config;

use self::config::{Cli, Config, OutputMode, SourceMode, TargetArg};

fn read_source(mode: &SourceMode) -> BitsyResult<String> {
    match mode {
        SourceMode::File(path) => FileReader::new(path).read_code(),
        SourceMode::Console => ConsoleReader::stdin().read_code(),
    }
}

fn run(config: &Config, source: &str) -> BitsyResult<()> {
    match &config.output {
        OutputMode::Tokens => print_tokens(source),
        OutputMode::Listing => {
            let program = bitsy::assemble(source)?;
            print!("{program}");
            Ok(())
        }
        OutputMode::Interpret { step_limit } => interpret(source, *step_limit),
        OutputMode::Console => translate(config.target, source, ConsoleEmitter),
        OutputMode::Build {
            final_path,
            retain_intermediate,
            run_binary,
        } => {
            let emitter = FileEmitter::new(final_path.as_str())
                .retain_intermediate(*retain_intermediate)
                .run_binary(*run_binary);
            translate(config.target, source, emitter)
        }
    }
}

fn translate<E: Emitter>(target: TargetArg, source: &str, emitter: E) -> BitsyResult<()> {
    match target {
        TargetArg::Rust => {
            bitsy::compile_str(source, TextGenerator::new(RustDialect, emitter))?.finalize()
        }
        TargetArg::Swift => {
            bitsy::compile_str(source, TextGenerator::new(SwiftDialect, emitter))?.finalize()
        }
    }
}

fn interpret(source: &str, step_limit: Option<usize>) -> BitsyResult<()> {
    info!("running bytecode interpreter");

    let program = bitsy::assemble(source)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut vm = Machine::new(VmConf { step_limit }, &program, stdin.lock(), stdout.lock());

    let start = Instant::now();
    let result = vm.execute();
    info!(
        "time taken: {}ms",
        start.elapsed().as_nanos() as f64 / 1000000.0
    );

    result
}

fn print_tokens(source: &str) -> BitsyResult<()> {
    let lexer = Lexer::new(source)?;

    println!(" offset:len token        fragment");
    for token in lexer {
        let token = token?;
        let offset = token.span.index;
        let len = token.span.size;
        // Debug output ignores width, so format it first.
        let kind = format!("{:?}", token.kind);
        let fragment = token.span.fragment(source).escape_debug();
        println!("{offset:7}:{len: <3} {kind: <12} \"{fragment}\"");
    }

    Ok(())
}

fn main() {
    if let Err(err) = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("failed to initialise logger: {err}");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                // FreeBSD EX_USAGE (64)
                process::exit(sysexits::EX_USAGE)
            }
        },
    };

    let (config, source) = match Config::from_cli(cli)
        .and_then(|config| read_source(&config.source).map(|source| (config, source)))
    {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(err.exit_code())
        }
    };

    if let Err(err) = run(&config, &source) {
        eprint!("{}", Diagnostic::new(&source, &err));
        process::exit(err.exit_code())
    }
}

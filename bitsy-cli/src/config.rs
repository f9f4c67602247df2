//! Command line arguments and the compiler configuration resolved from them.
use std::path::PathBuf;

use bitsy::{BitsyError, BitsyResult};
use clap::{Parser, ValueEnum};

const DEFAULT_OUTPUT: &str = "b.out";

/// Compiler for the Bitsy language.
#[derive(Debug, Parser)]
#[command(
    name = "bitsy",
    version = bitsy::IMPL_VERSION,
    disable_version_flag = true,
    long_about = None
)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Bitsy source file, must end in `.bitsy`
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Read Bitsy code from the command line, terminated by a '.'
    #[arg(short = 'c', long)]
    pub read_cli: bool,

    /// Name of the binary output
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Emit intermediate compilation to the command line
    #[arg(short, long)]
    pub emit_cli: bool,

    /// Immediately run and delete the compiled binary
    #[arg(short, long)]
    pub run_delete: bool,

    /// Retain the intermediate source after building
    #[arg(short = 'i', long)]
    pub retain_intermediate: bool,

    /// Language of the intermediate source
    #[arg(short, long, value_enum, default_value_t = TargetArg::Rust)]
    pub target: TargetArg,

    /// Compile to bytecode and run it in process
    #[arg(long, conflicts_with_all = ["emit_cli", "tokens", "listing"])]
    pub interpret: bool,

    /// Give up interpreting after this many instructions
    #[arg(long, value_name = "STEPS", requires = "interpret")]
    pub step_limit: Option<usize>,

    /// Print the token table and exit
    #[arg(long, conflicts_with = "listing")]
    pub tokens: bool,

    /// Print the bytecode listing and exit
    #[arg(long)]
    pub listing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Rust,
    Swift,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    File(PathBuf),
    Console,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Intermediate source printed to stdout.
    Console,
    /// Intermediate source built into an executable.
    Build {
        final_path: String,
        retain_intermediate: bool,
        run_binary: bool,
    },
    Interpret {
        step_limit: Option<usize>,
    },
    Tokens,
    Listing,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceMode,
    pub target: TargetArg,
    pub output: OutputMode,
}

impl Config {
    pub fn from_cli(cli: Cli) -> BitsyResult<Self> {
        let source = if cli.read_cli {
            SourceMode::Console
        } else {
            match cli.file {
                Some(path) => SourceMode::File(path),
                None => {
                    return Err(BitsyError::NoInput(
                        "please provide a valid .bitsy file for compilation; run -h for more info"
                            .to_string(),
                    ))
                }
            }
        };

        let output = if cli.tokens {
            OutputMode::Tokens
        } else if cli.listing {
            OutputMode::Listing
        } else if cli.interpret {
            OutputMode::Interpret {
                step_limit: cli.step_limit,
            }
        } else if cli.emit_cli {
            OutputMode::Console
        } else {
            OutputMode::Build {
                final_path: cli.output.unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
                retain_intermediate: cli.retain_intermediate,
                run_binary: cli.run_delete,
            }
        };

        Ok(Self {
            source,
            target: cli.target,
            output,
        })
    }
}

//! Destinations for generated code.
use std::{
    fs,
    process::{Command, ExitStatus, Stdio},
};

use log::{debug, info, warn};

use crate::{
    codegen::IntermediateBuilder,
    error::{BitsyError, BitsyResult},
};

/// Sink for the text produced by a text backend.
///
/// Chunks are appended in the order they are emitted. `finalize` is called
/// at most once, after the whole program was parsed.
pub trait Emitter {
    fn emit(&mut self, code: &str);

    fn finalize(&mut self, builder: &dyn IntermediateBuilder) -> BitsyResult<()>;
}

impl<E: Emitter + ?Sized> Emitter for Box<E> {
    fn emit(&mut self, code: &str) {
        (**self).emit(code)
    }

    fn finalize(&mut self, builder: &dyn IntermediateBuilder) -> BitsyResult<()> {
        (**self).finalize(builder)
    }
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn emit(&mut self, code: &str) {
        (**self).emit(code)
    }

    fn finalize(&mut self, builder: &dyn IntermediateBuilder) -> BitsyResult<()> {
        (**self).finalize(builder)
    }
}

/// Writes code straight to standard output.
#[derive(Debug, Default)]
pub struct ConsoleEmitter;

impl Emitter for ConsoleEmitter {
    fn emit(&mut self, code: &str) {
        print!("{code}");
    }

    fn finalize(&mut self, _builder: &dyn IntermediateBuilder) -> BitsyResult<()> {
        Ok(())
    }
}

/// Collects code in memory.
#[derive(Debug, Default)]
pub struct BufferEmitter {
    code: String,
}

impl BufferEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.code.as_str()
    }

    pub fn into_string(self) -> String {
        self.code
    }
}

impl Emitter for BufferEmitter {
    fn emit(&mut self, code: &str) {
        self.code.push_str(code);
    }

    fn finalize(&mut self, _builder: &dyn IntermediateBuilder) -> BitsyResult<()> {
        Ok(())
    }
}

/// Writes the intermediate source to disk and builds it into an executable.
#[derive(Debug)]
pub struct FileEmitter {
    final_path: String,
    retain_intermediate: bool,
    run_binary: bool,
    code: String,
}

impl FileEmitter {
    pub fn new(final_path: impl Into<String>) -> Self {
        Self {
            final_path: final_path.into(),
            retain_intermediate: false,
            run_binary: false,
            code: String::new(),
        }
    }

    /// Keep the intermediate source file after building.
    pub fn retain_intermediate(mut self, retain: bool) -> Self {
        self.retain_intermediate = retain;
        self
    }

    /// Run the built executable, then delete it.
    pub fn run_binary(mut self, run: bool) -> Self {
        self.run_binary = run;
        self
    }

    #[inline]
    pub fn final_path(&self) -> &str {
        self.final_path.as_str()
    }

    fn run_and_delete(&self) -> BitsyResult<()> {
        // A bare file name would be looked up on PATH.
        let command = if self.final_path.contains('/') {
            self.final_path.clone()
        } else {
            format!("./{}", self.final_path)
        };

        info!("running {command}");
        let status = exec(&command);

        // The binary goes away whether or not it ran successfully.
        debug!("deleting {}", self.final_path);
        let removed = fs::remove_file(&self.final_path);

        let status = status?;
        if !status.success() {
            return Err(BitsyError::Run {
                command,
                status: status.code(),
            });
        }
        removed?;

        Ok(())
    }
}

impl Emitter for FileEmitter {
    fn emit(&mut self, code: &str) {
        self.code.push_str(code);
    }

    fn finalize(&mut self, builder: &dyn IntermediateBuilder) -> BitsyResult<()> {
        let intermediate = builder.intermediate_path(&self.final_path);

        debug!("writing {intermediate}");
        fs::write(&intermediate, self.code.as_bytes())?;

        let command = builder.build_command(&self.final_path);
        info!("building {}", self.final_path);
        let status = exec(&command);

        if self.retain_intermediate {
            info!("intermediate source kept at {intermediate}");
        } else if let Err(err) = fs::remove_file(&intermediate) {
            warn!("failed to delete {intermediate}: {err}");
        }

        let status = status?;
        if !status.success() {
            return Err(BitsyError::Build {
                command,
                status: status.code(),
            });
        }

        if self.run_binary {
            self.run_and_delete()?;
        }

        Ok(())
    }
}

/// Run a shell command, echoing its standard output.
///
/// Standard error is inherited so toolchain diagnostics reach the user
/// as they happen.
fn exec(command: &str) -> BitsyResult<ExitStatus> {
    debug!("sh -c {command:?}");

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output()?;

    print!("{}", String::from_utf8_lossy(&output.stdout));

    Ok(output.status)
}

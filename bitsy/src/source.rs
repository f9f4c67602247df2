//! Where Bitsy source code comes from.
use std::{
    fs,
    io::{self, BufRead, StdinLock},
    path::PathBuf,
};

use log::debug;

use crate::error::{BitsyError, BitsyResult};

pub trait CodeReader {
    /// Read the complete program text.
    fn read_code(&mut self) -> BitsyResult<String>;
}

/// Reads a `.bitsy` file from disk.
#[derive(Debug, Clone)]
pub struct FileReader {
    path: PathBuf,
}

impl FileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CodeReader for FileReader {
    fn read_code(&mut self) -> BitsyResult<String> {
        let display = self.path.display().to_string();

        if !display.ends_with("bitsy") {
            return Err(BitsyError::NoInput(format!(
                "please provide a valid .bitsy file, \"{display}\" is not one"
            )));
        }

        debug!("reading source from {display}");

        fs::read_to_string(&self.path).map_err(|err| {
            BitsyError::NoInput(format!(
                "path to bitsy code was not valid ({display}: {err})"
            ))
        })
    }
}

/// Reads source code typed at the console.
///
/// Input ends at a line starting with `.`, or at end of input.
pub struct ConsoleReader<R> {
    input: R,
}

impl<R: BufRead> ConsoleReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl ConsoleReader<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> CodeReader for ConsoleReader<R> {
    fn read_code(&mut self) -> BitsyResult<String> {
        let mut code = String::new();
        let mut line = String::new();

        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 || line.starts_with('.') {
                break;
            }
            code.push_str(&line);
        }

        Ok(code)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_console_reader_stops_at_dot() {
        let input = "BEGIN\nPRINT 1\nEND\n.\nignored\n";
        let mut reader = ConsoleReader::new(input.as_bytes());
        assert_eq!(reader.read_code().unwrap(), "BEGIN\nPRINT 1\nEND\n");
    }

    #[test]
    fn test_console_reader_end_of_input() {
        let mut reader = ConsoleReader::new("BEGIN END".as_bytes());
        assert_eq!(reader.read_code().unwrap(), "BEGIN END");
    }

    #[test]
    fn test_file_reader_extension() {
        let mut reader = FileReader::new("program.txt");
        assert!(matches!(reader.read_code(), Err(BitsyError::NoInput(_))));
    }
}

use std::path::PathBuf;
use std::fmt::Display;

pub trait ErrorType: Display + PartialEq {}

#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    // Location for text that did not come from a file
    pub fn inline(line: usize) -> Self {
        Location {
            file: PathBuf::from("<input>"),
            line
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

pub type Errors<T> = Vec<Error<T>>;

// Prints an error without a location in the same colors as `Error`
pub fn report(error: &impl Display) {
    eprintln!("\x1b[31;49;1m[error]\x1b[39;49;1m  {}\x1b[0m", error);
}

pub fn warn(message: &impl Display) {
    eprintln!("\x1b[33;49;1m[warning]\x1b[39;49;1m  {}\x1b[0m", message);
}

pub fn note(message: &impl Display) {
    eprintln!("\x1b[36;49;1m[info]\x1b[0m  {}", message);
}

//! Errors and error-related utilities.

use std::{error, fmt, result};

/// The error type used throughout this library.
///
/// Errors must cross worker threads in batch jobs, hence `Send + Sync`.
pub type Error = Box<dyn error::Error + Send + Sync>;

/// The result type used throughout this library.
pub type Result<T> = result::Result<T, Error>;

/// Invalid input: a match file or a table that does not have the expected shape.
#[derive(Debug)]
pub struct InvalidInput(pub String);

/// Invalid argument, e.g. an unknown team name or a bad threshold.
#[derive(Debug)]
pub struct InvalidArgument(pub String);

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid input: {}", self.0)
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid argument: {}", self.0)
    }
}

impl error::Error for InvalidInput {}

impl error::Error for InvalidArgument {}

/// A helper for constructing [InvalidInput].
pub fn invalid_input(s: String) -> Error {
    InvalidInput(s).into()
}

/// A helper for constructing [InvalidInput].
pub fn invalid_input_ref(s: &str) -> Error {
    InvalidInput(s.to_owned()).into()
}

/// A helper for constructing [InvalidArgument].
pub fn invalid_argument(s: String) -> Error {
    InvalidArgument(s).into()
}

/// A helper for constructing [InvalidArgument].
pub fn invalid_argument_ref(s: &str) -> Error {
    InvalidArgument(s.to_owned()).into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            format!("{}", invalid_input_ref("no innings")),
            "invalid input: no innings"
        );
        assert_eq!(
            format!("{}", invalid_argument("top must be positive".to_owned())),
            "invalid argument: top must be positive"
        );
    }

    #[test]
    fn downcast() {
        let e = invalid_input_ref("x");
        assert!(e.downcast_ref::<InvalidInput>().is_some());
        assert!(e.downcast_ref::<InvalidArgument>().is_none());
    }
}

use std::fmt;

#[derive(Debug)]
pub struct Error(Repr);

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // raw words or codes handed to us did not match the expected layout
    BadFormat,
    // a source location could not be resolved against the source map
    BadLocation
}

impl Error {
    pub fn new<E>(error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error(Repr::Custom(error.into()))
    }

    pub fn new_const(kind : ErrorKind, message: &'static str) -> Self {
        Error(Repr::SimpleMessage(kind, message))
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match &self.0 {
            Repr::Simple(k) | Repr::SimpleMessage(k, _) => Some(*k),
            Repr::Custom(_) => None
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(e: ErrorKind) -> Self {
        Error(Repr::Simple(e))
    }
}

#[derive(Debug)]
enum Repr {
    Simple(ErrorKind),
    SimpleMessage(ErrorKind, &'static str),
    Custom(Box<dyn std::error::Error + Send + Sync>)
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match &self.0 {
            Repr::Simple(k) => write!(fmt, "{:?}", k),
            Repr::SimpleMessage(k, m) => write!(fmt, "{:?}: {}", k, m),
            Repr::Custom(e) => write!(fmt, "{}", e)
        }
    }
}

impl std::error::Error for Error {}

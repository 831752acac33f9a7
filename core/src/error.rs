use std::error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingError {
    InvalidNumber {
        field: &'static str,
        value: std::string::String,
    },
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadingError::InvalidNumber { field, value } => {
                write!(f, "Invalid reading: {} is not a number ({:?})", field, value)
            }
        }
    }
}

impl error::Error for ReadingError {}

use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    BatchExceedsBuffer {
        got: usize,
        capacity: usize,
    },
    OutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
    InvalidConfig(&'static str),
    InvalidLabel {
        label: f32,
        nclasses: usize,
    },
    Distribution(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::BatchExceedsBuffer { got, capacity } => write!(
                f,
                "The incoming batch has {got} rows but the memory buffer only holds {capacity}"
            ),
            MlErr::OutOfBounds { what, index, len } => {
                write!(f, "{what} index {index} is out of bounds, there are {len}")
            }
            MlErr::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            MlErr::InvalidLabel { label, nclasses } => write!(
                f,
                "label {label} is not a class index in 0..{nclasses}"
            ),
            MlErr::Distribution(msg) => write!(f, "invalid distribution: {msg}"),
        }
    }
}

impl Error for MlErr {}

use std::{error::Error, fmt};

use machine_learning::MlErr;
use plotters::drawing::DrawingAreaErrorKind;

/// The plotting module's result type.
pub type Result<T> = std::result::Result<T, PlotErr>;

/// Plotting failures.
#[derive(Debug)]
pub enum PlotErr {
    Drawing(String),
    Ml(MlErr),
    UnknownAgent(String),
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

impl fmt::Display for PlotErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotErr::Drawing(e) => write!(f, "drawing error: {e}"),
            PlotErr::Ml(e) => write!(f, "prediction error: {e}"),
            PlotErr::UnknownAgent(name) => write!(f, "there's no color for agent {name:?}"),
            PlotErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}: got {got}, expected {expected}"),
        }
    }
}

impl Error for PlotErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlotErr::Ml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for PlotErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

/// Flattens a backend error, its type depends on the backend being drawn on.
pub(crate) fn drawing<E: Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> PlotErr {
    PlotErr::Drawing(e.to_string())
}

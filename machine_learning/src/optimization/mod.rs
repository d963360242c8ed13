mod adam;
mod gradient_descent;
mod gradient_descent_with_momentum;
mod optimizer;

pub use adam::{Adam, AdamState};
pub use gradient_descent::GradientDescent;
pub use gradient_descent_with_momentum::{GradientDescentWithMomentum, TraceState};
pub use optimizer::{Optimizer, apply_updates};

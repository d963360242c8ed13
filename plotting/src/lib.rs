mod classification;
mod colors;
mod data;
pub mod error;
mod regression;

pub use classification::plot_classification_2d;
pub use colors::{agent_color, class_color, diverging_color};
pub use data::{grid_2d, sort_data};
pub use error::{PlotErr, Result};
pub use regression::plot_regression_posterior_predictive;

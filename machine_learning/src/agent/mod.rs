mod base;
mod config;
mod sgd_agent;

pub use base::{Agent, BeliefState, Info};
pub use config::SgdAgentConfig;
pub use sgd_agent::SgdAgent;

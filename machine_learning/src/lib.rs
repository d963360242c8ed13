pub mod agent;
pub mod arch;
pub mod environment;
pub mod error;
pub mod initialization;
pub mod memory;
pub mod optimization;

pub use agent::{Agent, BeliefState, Info, SgdAgent, SgdAgentConfig};
pub use error::{MlErr, Result};

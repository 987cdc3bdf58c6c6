pub mod linear_q;

pub use linear_q::{LinearQAgent, LinearQAgentConfig, Mode};

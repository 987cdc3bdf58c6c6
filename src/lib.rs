/// Commands and the flat action index
pub mod action;

/// Implemented RL algorithms
pub mod algo;

/// Loading text corpora
pub mod corpus;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Epoch and run drivers
pub mod experiment;

/// Exploration policies
pub mod exploration;

/// Bag-of-words features
pub mod feature;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

pub mod util;

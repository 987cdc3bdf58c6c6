mod weights;

pub use weights::{argmax, WeightMatrix};

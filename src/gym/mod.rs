pub mod home_world;

pub use home_world::HomeWorld;

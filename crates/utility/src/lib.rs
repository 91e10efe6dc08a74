pub mod env;
pub mod geo;

//! AI systems (decision layer)

pub mod brain;

pub use brain::*;

//! Data models

mod generator;
mod settings;

pub use generator::*;
pub use settings::*;

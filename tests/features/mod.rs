//! Cucumber features for the generators API


pub use support::TestWorld;

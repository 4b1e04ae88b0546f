// # Config Source Implementations
//
// This module provides implementations of the ConfigSource trait.

pub mod file;
pub mod fixed;

pub use file::FileConfigSource;
pub use fixed::FixedConfigSource;

//! Shared utility types

pub mod span;

pub use span::{Position, Region};

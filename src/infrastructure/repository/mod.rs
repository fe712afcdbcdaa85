//! Repository implementations.

pub mod inmemory;

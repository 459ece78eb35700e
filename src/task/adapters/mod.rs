//! Adapter implementations for the task store port.

pub mod file;
pub mod memory;

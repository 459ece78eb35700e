//! Unit tests for batch task generation.

//! Property-based tests

mod directory_proptest;
mod gate_proptest;

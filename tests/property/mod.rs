//! Property-based tests

pub mod ordering_proptest;

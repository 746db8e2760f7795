//! Property-based tests for arbitrary precision arithmetic.

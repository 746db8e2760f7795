//! Property-based tests for ball arithmetic.
//!
//! The central property is *enclosure soundness*: evaluating an operation
//! on balls must produce a ball containing the result of evaluating it on
//! any member points. We test it on the midpoints, which are always
//! members.

//! Forward-mode automatic differentiation.
//!
//! The model is small enough that exact forward-mode gradients (one seeded
//! pass per parameter) beat any tape machinery; the only primitive needed is
//! the dual number.

pub mod dual;

pub use dual::Dual;

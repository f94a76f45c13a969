pub mod autodiff;
pub mod consolidate;
pub mod error;
pub mod model;
pub mod quantum;

pub use error::{Error, Result};

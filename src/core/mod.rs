pub mod error;
pub mod money;
pub mod normalize;

pub use error::{AppError, Result};

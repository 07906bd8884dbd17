pub mod error;

pub use error::{CoreError, ErrorCategory, Result};

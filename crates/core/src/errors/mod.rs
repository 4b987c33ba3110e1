//! Error types and result extensions for pulse operations

mod conversions;
mod extensions;
mod types;

pub use extensions::*;
pub use types::{Error, HandlerError, Result};

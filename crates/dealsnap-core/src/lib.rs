pub mod debt;
pub mod error;
pub mod signals;
pub mod time_value;
pub mod types;

mod validation;

#[cfg(feature = "underwrite")]
pub mod underwrite;

#[cfg(feature = "quick")]
pub mod quick;

pub use error::DealSnapError;
pub use types::*;

/// Standard result type for all dealsnap operations
pub type DealSnapResult<T> = Result<T, DealSnapError>;

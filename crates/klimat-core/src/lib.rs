pub mod error;
pub mod series;
pub mod types;
pub mod units;

#[cfg(feature = "trend")]
pub mod trend;

#[cfg(feature = "ranking")]
pub mod ranking;

#[cfg(feature = "transform")]
pub mod transform;

pub use error::KlimatError;
pub use types::*;

/// Standard result type for all engine operations
pub type KlimatResult<T> = Result<T, KlimatError>;

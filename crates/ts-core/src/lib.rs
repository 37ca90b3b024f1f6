//! ts-core: shared foundation for tanksim.
//!
//! Contains:
//! - units (uom SI types + constructors for tank quantities)
//! - numeric (Real + range checks used by parameter validation)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{TsError, TsResult};
pub use numeric::*;
pub use units::*;

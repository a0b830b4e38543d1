//! Service operations, grouped by the record they serve.
//!
//! Each module adds methods to `ChariotService` via `impl ChariotService` blocks.

pub mod equipment;
pub mod fleet;
pub mod inspection;
pub mod ticket;

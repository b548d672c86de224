//! Aggregations over a loaded session.
//!
//! Per-school environment means, the EC join onto growth records, EC-grouped
//! mean biomass, and the optimal EC lookup. Everything is recomputed from the
//! session on each call.

pub mod aggregate;
pub mod types;
pub mod utility;

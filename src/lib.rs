//! glucochart: clinical timeline geometry for automated insulin delivery.
//!
//! This crate turns the event collections of a closed-loop dosing app
//! (glucose readings, boluses, carbs, basal delivery, temp targets and
//! algorithm prediction series) into immutable, renderer-agnostic geometry:
//! basal staircases, dot sets with label values, filled bands and axis
//! geometry. Recomputation runs on a background worker pool and publishes
//! per-subset snapshots atomically, so a live display never tears.

pub mod compositor;
pub mod core;
pub mod error;
pub mod telemetry;

pub use compositor::{ChartGeometry, ChartInputs, Compositor, GeometrySubset, SubsetState};
pub use error::{ChartError, ChartResult};

//! The deterministic calculation engine: a small set of scalar levers in,
//! the full set of derived business metrics out. Every stage is a pure
//! function; the whole pipeline is recomputed on each parameter change.

pub mod engine;
pub mod metrics;
pub mod params;
pub mod tasks;

pub use engine::{
    Capital, DerivedModel, InputVolumes, Labor, OutputVolumes, Projection, Revenue, derive,
};
pub use params::{ParamChange, ParamLimits, ScenarioParams};

/// Fixed weeks-per-month constant used for all weekly -> monthly conversions.
pub const WEEKS_PER_MONTH: f64 = 4.0;

/// Calibration baseline: the household count all scaling factors and fixed
/// conversion ratios are defined against.
pub const REFERENCE_HOUSEHOLDS: f64 = 15.0;

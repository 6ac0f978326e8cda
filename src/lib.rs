//! compostflow models a neighbourhood composting co-op as a parameter-driven
//! flow diagram: a deterministic metrics engine on one side, a 2D layout and
//! connector-routing engine on the other, joined by per-node metric lines.

pub mod diagram;
pub mod fonts;
pub mod model;
pub mod scenario;
pub mod theme;
pub mod xml;

pub use scenario::Scenario;
pub use theme::Theme;

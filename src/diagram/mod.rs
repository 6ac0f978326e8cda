//! The visual half of the crate: graph types, connector geometry, layout,
//! persisted position overrides, pointer interaction, and SVG rendering.

pub mod geometry;
pub mod interact;
pub mod layout;
pub mod positions;
pub mod render;
pub mod types;

pub use geometry::Point;
pub use interact::{CanvasRect, DragUpdate, InteractionController};
pub use layout::{Canvas, EdgeLayout, LayoutEngine, NodeLayout};
pub use positions::{FileBackend, MemoryBackend, NormPos, PositionBackend, PositionStore};
pub use render::{render_diagram, DiagramStyle};
pub use types::{FlowEdge, FlowGraph, FlowNode, NodeCategory};

//! Pointer gesture state machine with three phases (idle, armed,
//! dragging), driven purely by measured displacement; no timers, no
//! cleanup races.
//! A press that never travels past the threshold is a click and opens the
//! node's detail view; a press that does (with edit mode on) drags the
//! node, writing clamped, rounded coordinates through the position store.

use super::geometry::Point;
use super::positions::{PositionBackend, PositionStore};

/// Displacement in screen pixels past which a press stops being a click.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;
/// Dragged nodes are confined to this normalized sub-range per axis, so a
/// node can never leave the canvas entirely.
pub const DRAG_CLAMP: [f64; 2] = [0.05, 0.95];
/// Normalized coordinates are rounded to this granularity before writing.
pub const DRAG_GRANULARITY: f64 = 0.01;

/// The canvas's position and size in screen coordinates, captured at
/// pointer-down so mid-gesture scrolling cannot skew the mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    /// Pointer down on a node, displacement still under the threshold.
    Armed {
        node_id: String,
        origin: Point,
        canvas: CanvasRect,
        passed_threshold: bool,
    },
    Dragging {
        node_id: String,
        canvas: CanvasRect,
    },
}

/// A node was dragged to a new normalized position; edge layout is stale
/// and must be recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub node_id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    phase: Option<Phase>,
    edit_mode: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            phase: Some(Phase::Idle),
            edit_mode: false,
        }
    }

    /// Edit mode gates dragging only; clicks open detail views either way.
    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Some(Phase::Dragging { .. }))
    }

    pub fn pointer_down(&mut self, node_id: &str, at: Point, canvas: CanvasRect) {
        self.phase = Some(Phase::Armed {
            node_id: node_id.to_string(),
            origin: at,
            canvas,
            passed_threshold: false,
        });
    }

    /// Advance the gesture. Returns a `DragUpdate` whenever the node moved
    /// and the caller must recompute edge geometry. A move without a
    /// matching pointer-down is a no-op.
    pub fn pointer_move<B: PositionBackend>(
        &mut self,
        at: Point,
        store: &mut PositionStore<B>,
    ) -> Option<DragUpdate> {
        let phase = self.phase.take().unwrap_or(Phase::Idle);

        let (next, update) = match phase {
            Phase::Idle => (Phase::Idle, None),
            Phase::Armed {
                node_id,
                origin,
                canvas,
                passed_threshold,
            } => {
                let passed = passed_threshold || origin.distance_to(at) > DRAG_THRESHOLD_PX;
                if passed && self.edit_mode {
                    let update = apply_drag(&node_id, at, canvas, store);
                    (Phase::Dragging { node_id, canvas }, update)
                } else {
                    (
                        Phase::Armed {
                            node_id,
                            origin,
                            canvas,
                            passed_threshold: passed,
                        },
                        None,
                    )
                }
            }
            Phase::Dragging { node_id, canvas } => {
                let update = apply_drag(&node_id, at, canvas, store);
                (Phase::Dragging { node_id, canvas }, update)
            }
        };

        self.phase = Some(next);
        update
    }

    /// End the gesture. Returns the clicked node when the press never
    /// traveled past the threshold; a stray pointer-up is a no-op.
    pub fn pointer_up(&mut self) -> Option<String> {
        let phase = self.phase.take().unwrap_or(Phase::Idle);
        self.phase = Some(Phase::Idle);

        match phase {
            Phase::Armed {
                node_id,
                passed_threshold: false,
                ..
            } => Some(node_id),
            _ => None,
        }
    }
}

/// Map the pointer to a normalized coordinate, clamp it into the safe
/// sub-range, snap it to the grid, and write it through the store. The
/// snap can nudge a boundary value just past the range, so it is clamped
/// again before the write.
fn apply_drag<B: PositionBackend>(
    node_id: &str,
    at: Point,
    canvas: CanvasRect,
    store: &mut PositionStore<B>,
) -> Option<DragUpdate> {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return None;
    }

    let x = clamp_norm(snap(clamp_norm((at.x - canvas.left) / canvas.width)));
    let y = clamp_norm(snap(clamp_norm((at.y - canvas.top) / canvas.height)));
    store.set(node_id, x, y);

    Some(DragUpdate {
        node_id: node_id.to_string(),
        x,
        y,
    })
}

fn clamp_norm(v: f64) -> f64 {
    v.max(DRAG_CLAMP[0]).min(DRAG_CLAMP[1])
}

fn snap(v: f64) -> f64 {
    (v / DRAG_GRANULARITY).round() * DRAG_GRANULARITY
}

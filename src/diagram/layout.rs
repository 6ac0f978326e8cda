//! Places the flow graph on a pixel canvas. Layout is recomputed from
//! scratch on every call: the graph is tiny, and full recomputation can
//! never go stale the way partial invalidation can.

use std::collections::HashMap;

use log::debug;

use crate::fonts::TextMeasure;

use super::geometry::{self, Point};
use super::positions::{PositionBackend, PositionStore};
use super::types::FlowGraph;

/// Inset keeping node boxes clear of the canvas border.
pub const CANVAS_PADDING: f64 = 24.0;
pub const MIN_NODE_WIDTH: f64 = 110.0;
pub const NODE_HEIGHT: f64 = 64.0;
const NODE_PADDING_H: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Absolute pixel placement of one node box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl NodeLayout {
    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }
}

/// Connector geometry for one resolvable edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub edge_id: String,
    pub start: Point,
    pub end: Point,
    pub path: String,
    pub label_pos: Option<Point>,
}

pub struct LayoutEngine<'a, T: TextMeasure> {
    measure: &'a mut T,
    font_size: f32,
}

impl<'a, T: TextMeasure> LayoutEngine<'a, T> {
    pub fn new(measure: &'a mut T, font_size: f32) -> Self {
        Self { measure, font_size }
    }

    /// Resolve every node to an absolute center plus a box sized to its
    /// label. Pure given the canvas and the store's current overrides.
    pub fn node_layout<B: PositionBackend>(
        &mut self,
        graph: &FlowGraph,
        store: &PositionStore<B>,
        canvas: Canvas,
    ) -> HashMap<String, NodeLayout> {
        let span_x = (canvas.width - CANVAS_PADDING * 2.0).max(0.0);
        let span_y = (canvas.height - CANVAS_PADDING * 2.0).max(0.0);

        graph
            .nodes
            .iter()
            .map(|node| {
                let norm = store.resolve(&node.id, graph);
                let (label_w, _) = self.measure.measure_text(&node.label, self.font_size, true);
                let width = (label_w as f64 + NODE_PADDING_H * 2.0).max(MIN_NODE_WIDTH);

                let layout = NodeLayout {
                    center: Point::new(
                        CANVAS_PADDING + norm.x * span_x,
                        CANVAS_PADDING + norm.y * span_y,
                    ),
                    width,
                    height: NODE_HEIGHT,
                };
                (node.id.clone(), layout)
            })
            .collect()
    }

    /// Anchor both ends of every edge on its nodes' perimeters and build
    /// the connector path. Edges with a missing endpoint are skipped, not
    /// reported.
    pub fn edge_layout<B: PositionBackend>(
        &mut self,
        graph: &FlowGraph,
        store: &PositionStore<B>,
        canvas: Canvas,
    ) -> Vec<EdgeLayout> {
        let nodes = self.node_layout(graph, store, canvas);
        let mut edges = Vec::with_capacity(graph.edges.len());

        for edge in &graph.edges {
            let (Some(from), Some(to)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
                debug!("edge {} references a missing node, skipping", edge.id);
                continue;
            };

            let start =
                geometry::perimeter_intersection(from.center, to.center, from.width, from.height);
            let end =
                geometry::perimeter_intersection(to.center, from.center, to.width, to.height);

            edges.push(EdgeLayout {
                edge_id: edge.id.clone(),
                start,
                end,
                path: geometry::flow_path(start, end),
                label_pos: edge
                    .label
                    .as_ref()
                    .map(|_| geometry::label_anchor(start, end)),
            });
        }

        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::positions::MemoryBackend;
    use crate::diagram::types::FlowEdge;
    use crate::fonts::FixedTextMeasure;
    use crate::scenario::Scenario;

    fn engine(measure: &mut FixedTextMeasure) -> LayoutEngine<'_, FixedTextMeasure> {
        LayoutEngine::new(measure, 14.0)
    }

    #[test]
    fn every_node_lands_inside_the_padded_canvas() {
        let scenario = Scenario::builtin();
        let store = PositionStore::open(MemoryBackend::new());
        let canvas = Canvas::new(1200.0, 700.0);
        let mut measure = FixedTextMeasure;

        let nodes = engine(&mut measure).node_layout(&scenario.graph, &store, canvas);
        assert_eq!(nodes.len(), scenario.graph.nodes.len());

        for layout in nodes.values() {
            assert!(layout.center.x >= CANVAS_PADDING);
            assert!(layout.center.x <= canvas.width - CANVAS_PADDING);
            assert!(layout.center.y >= CANVAS_PADDING);
            assert!(layout.center.y <= canvas.height - CANVAS_PADDING);
            assert!(layout.width >= MIN_NODE_WIDTH);
        }
    }

    #[test]
    fn all_builtin_edges_resolve() {
        let scenario = Scenario::builtin();
        let store = PositionStore::open(MemoryBackend::new());
        let mut measure = FixedTextMeasure;

        let edges =
            engine(&mut measure).edge_layout(&scenario.graph, &store, Canvas::new(1200.0, 700.0));
        assert_eq!(edges.len(), scenario.graph.edges.len());

        for edge in &edges {
            assert!(edge.path.starts_with("M "));
            assert!(edge.path.contains(" C "));
        }
    }

    #[test]
    fn edges_with_a_missing_endpoint_are_silently_excluded() {
        let mut scenario = Scenario::builtin();
        scenario.graph.edges.push(FlowEdge {
            id: "ghost".to_string(),
            from: "wormery".to_string(),
            to: "sales".to_string(),
            material: "compost".to_string(),
            label: None,
            color: "#000000".to_string(),
            bidirectional: false,
        });

        let store = PositionStore::open(MemoryBackend::new());
        let mut measure = FixedTextMeasure;
        let edges =
            engine(&mut measure).edge_layout(&scenario.graph, &store, Canvas::new(1200.0, 700.0));

        assert_eq!(edges.len(), scenario.graph.edges.len() - 1);
        assert!(edges.iter().all(|e| e.edge_id != "ghost"));
    }

    #[test]
    fn labeled_edges_get_an_anchor_above_the_midpoint() {
        let scenario = Scenario::builtin();
        let store = PositionStore::open(MemoryBackend::new());
        let mut measure = FixedTextMeasure;
        let edges =
            engine(&mut measure).edge_layout(&scenario.graph, &store, Canvas::new(1200.0, 700.0));

        for layout in &edges {
            let edge = scenario
                .graph
                .edges
                .iter()
                .find(|e| e.id == layout.edge_id)
                .expect("edge config");
            assert_eq!(layout.label_pos.is_some(), edge.label.is_some());
            if let Some(anchor) = layout.label_pos {
                let mid_y = (layout.start.y + layout.end.y) / 2.0;
                assert!(anchor.y < mid_y);
            }
        }
    }

    #[test]
    fn moving_a_node_moves_its_edges_on_the_next_recompute() {
        let scenario = Scenario::builtin();
        let mut store = PositionStore::open(MemoryBackend::new());
        let canvas = Canvas::new(1200.0, 700.0);
        let mut measure = FixedTextMeasure;

        let before = engine(&mut measure).edge_layout(&scenario.graph, &store, canvas);
        store.set("sifting", 0.3, 0.9);
        let after = engine(&mut measure).edge_layout(&scenario.graph, &store, canvas);

        let pick = |edges: &[EdgeLayout]| {
            edges
                .iter()
                .find(|e| e.edge_id == "bays_to_sifting")
                .expect("edge")
                .clone()
        };
        assert_ne!(pick(&before).end, pick(&after).end);
    }
}

//! SVG fragment generation for the flow diagram: edges behind, nodes on
//! top, each node carrying its icon, label, and live metric line.

use crate::fonts::TextMeasure;
use crate::model::engine::DerivedModel;
use crate::model::metrics;
use crate::model::params::ScenarioParams;
use crate::scenario::Scenario;
use crate::xml::escape_xml;

use super::layout::{Canvas, LayoutEngine, NodeLayout};
use super::positions::{PositionBackend, PositionStore};
use super::types::{FlowNode, NodeCategory};

/// Style configuration for diagram rendering.
#[derive(Debug, Clone)]
pub struct DiagramStyle {
    pub node_fill: String,
    pub node_text: String,
    pub metric_text: String,
    pub edge_text: String,
    pub background: String,
    pub font_family: String,
    pub font_size: f32,
    pub metric_font_size: f32,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            node_fill: "#f6f4ec".to_string(),
            node_text: "#2f3e2e".to_string(),
            metric_text: "#4c7a3d".to_string(),
            edge_text: "#666666".to_string(),
            background: "#fdfcf7".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            metric_font_size: 11.0,
        }
    }
}

impl DiagramStyle {
    pub fn from_theme(theme: &crate::theme::Theme) -> Self {
        Self {
            node_fill: theme.panel_color.clone(),
            node_text: theme.text_color.clone(),
            metric_text: theme.accent_color.clone(),
            edge_text: theme.muted_color.clone(),
            background: theme.background_color.clone(),
            font_family: "sans-serif".to_string(),
            font_size: theme.font_size_base,
            metric_font_size: theme.font_size_small,
        }
    }
}

/// Node border color per category.
pub fn category_color(category: NodeCategory) -> &'static str {
    match category {
        NodeCategory::Input => "#3d6d7a",
        NodeCategory::Labor => "#8a6d3b",
        NodeCategory::Composting => "#4c7a3d",
        NodeCategory::Processing => "#6d5c3f",
        NodeCategory::Output => "#7a3d5e",
    }
}

/// Render the full diagram fragment for one scenario snapshot. The caller
/// wraps the fragment in an `<svg>` document of the given canvas size.
pub fn render_diagram<T: TextMeasure, B: PositionBackend>(
    scenario: &Scenario,
    params: &ScenarioParams,
    model: &DerivedModel,
    store: &PositionStore<B>,
    style: &DiagramStyle,
    canvas: Canvas,
    measure: &mut T,
) -> String {
    let mut engine = LayoutEngine::new(measure, style.font_size);
    let nodes = engine.node_layout(&scenario.graph, store, canvas);
    let edges = engine.edge_layout(&scenario.graph, store, canvas);

    let mut svg = String::new();

    // Edges first, so connectors sit behind the node boxes.
    for layout in &edges {
        let Some(edge) = scenario.graph.edges.iter().find(|e| e.id == layout.edge_id) else {
            continue;
        };

        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="1.8" />"#,
            layout.path, edge.color
        ));

        let angle = (layout.end.y - layout.start.y).atan2(layout.end.x - layout.start.x);
        svg.push_str(&arrow_head(layout.end.x, layout.end.y, angle, &edge.color));
        if edge.bidirectional {
            let tail_angle = angle + std::f64::consts::PI;
            svg.push_str(&arrow_head(
                layout.start.x,
                layout.start.y,
                tail_angle,
                &edge.color,
            ));
        }

        if let (Some(label), Some(anchor)) = (&edge.label, layout.label_pos) {
            let label_width = label.chars().count() as f64 * 6.2 + 8.0;
            let label_height = style.metric_font_size as f64 + 6.0;

            svg.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="2" fill="{}" />"#,
                anchor.x - label_width / 2.0,
                anchor.y - label_height / 2.0,
                label_width,
                label_height,
                style.background
            ));
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text>"#,
                anchor.x,
                anchor.y + style.metric_font_size as f64 / 3.0,
                style.font_family,
                style.metric_font_size,
                style.edge_text,
                escape_xml(label)
            ));
        }
    }

    for node in &scenario.graph.nodes {
        if let Some(layout) = nodes.get(&node.id) {
            svg.push_str(&render_node(node, layout, params, model, style));
        }
    }

    svg
}

fn render_node(
    node: &FlowNode,
    layout: &NodeLayout,
    params: &ScenarioParams,
    model: &DerivedModel,
    style: &DiagramStyle,
) -> String {
    let mut svg = String::new();
    let stroke = category_color(node.category);

    svg.push_str(&format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="10" fill="{}" stroke="{}" stroke-width="1.5" />"#,
        layout.left(),
        layout.top(),
        layout.width,
        layout.height,
        style.node_fill,
        stroke
    ));

    let cx = layout.center.x;
    let top = layout.top();

    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" text-anchor="middle">{}</text>"#,
        cx,
        top + 20.0,
        style.font_size + 2.0,
        escape_xml(&node.icon)
    ));

    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" font-weight="bold" fill="{}" text-anchor="middle">{}</text>"#,
        cx,
        top + 38.0,
        style.font_family,
        style.font_size,
        style.node_text,
        escape_xml(&node.label)
    ));

    if let Some(metric) = metrics::metric_for(&node.id, params, model) {
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text>"#,
            cx,
            top + 54.0,
            style.font_family,
            style.metric_font_size,
            style.metric_text,
            escape_xml(&metric)
        ));
    }

    svg
}

fn arrow_head(x: f64, y: f64, angle: f64, color: &str) -> String {
    let cos = angle.cos();
    let sin = angle.sin();
    let p1 = (x - cos * 11.0 + sin * 5.0, y - sin * 11.0 - cos * 5.0);
    let p2 = (x - cos * 11.0 - sin * 5.0, y - sin * 11.0 + cos * 5.0);

    format!(
        r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}" />"#,
        x, y, p1.0, p1.1, p2.0, p2.1, color
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::positions::MemoryBackend;
    use crate::fonts::FixedTextMeasure;
    use crate::model::engine::derive;

    fn fragment() -> (Scenario, String) {
        let scenario = Scenario::builtin();
        let params = ScenarioParams::default();
        let model = derive(&params, &scenario);
        let store = PositionStore::open(MemoryBackend::new());
        let style = DiagramStyle::default();
        let mut measure = FixedTextMeasure;

        let svg = render_diagram(
            &scenario,
            &params,
            &model,
            &store,
            &style,
            Canvas::new(1200.0, 700.0),
            &mut measure,
        );
        (scenario, svg)
    }

    #[test]
    fn one_connector_path_per_resolvable_edge() {
        let (scenario, svg) = fragment();
        let paths = svg.matches("<path d=\"M ").count();
        assert_eq!(paths, scenario.graph.edges.len());
    }

    #[test]
    fn bidirectional_edges_get_a_tail_arrowhead() {
        let (scenario, svg) = fragment();
        let arrowheads = svg.matches("<polygon points=").count();
        let bidirectional = scenario
            .graph
            .edges
            .iter()
            .filter(|e| e.bidirectional)
            .count();
        assert_eq!(arrowheads, scenario.graph.edges.len() + bidirectional);
    }

    #[test]
    fn node_labels_are_xml_escaped() {
        let (_, svg) = fragment();
        assert!(svg.contains("Sifting &amp; bagging"));
        assert!(!svg.contains("Sifting & bagging"));
    }

    #[test]
    fn every_node_shows_its_metric_line() {
        let (_, svg) = fragment();
        assert!(svg.contains("15 households"));
        assert!(svg.contains("$4425/mo"));
        assert!(svg.contains("187.5 L/mo sellable"));
    }
}

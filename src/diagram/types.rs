use serde::{Deserialize, Serialize};

/// What a stage contributes to the pipeline. Drives node coloring and
/// which derived-model figure is shown on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Input,
    Labor,
    Composting,
    Processing,
    Output,
}

/// Unit a task's duration is quoted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPeriod {
    Week,
    Month,
}

impl TaskPeriod {
    pub fn periods_per_month(self) -> f64 {
        match self {
            TaskPeriod::Week => crate::model::WEEKS_PER_MONTH,
            TaskPeriod::Month => 1.0,
        }
    }
}

/// Whether a task's hours grow with household count or are calendar/batch
/// bound regardless of volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskScaling {
    #[default]
    Linear,
    Fixed,
}

/// A named sub-task attached to a node, quoted in minutes per period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTask {
    pub name: String,
    pub minutes: f64,
    pub period: TaskPeriod,
    #[serde(default)]
    pub scaling: TaskScaling,
}

impl NodeTask {
    /// Hours per month before any household scaling.
    pub fn base_hours_per_month(&self) -> f64 {
        self.minutes / 60.0 * self.period.periods_per_month()
    }
}

/// A stage or actor in the material-flow graph. Immutable configuration;
/// only the resolved position moves, via the position store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub category: NodeCategory,
    pub icon: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Normalized default position, both axes in [0, 1].
    #[serde(default = "center_position")]
    pub position: [f64; 2],
    #[serde(default)]
    pub tasks: Vec<NodeTask>,
}

fn center_position() -> [f64; 2] {
    [0.5, 0.5]
}

/// A directed material flow between two nodes. The bidirectional flag only
/// adds a tail arrowhead; routing is unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub material: String,
    #[serde(default)]
    pub label: Option<String>,
    pub color: String,
    #[serde(default)]
    pub bidirectional: bool,
}

/// The fixed node/edge catalog for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Configured default position for a node, if the node exists.
    pub fn default_position(&self, id: &str) -> Option<[f64; 2]> {
        self.node(id).map(|n| n.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_hours_convert_minutes_and_period() {
        let weekly = NodeTask {
            name: "Sifting".to_string(),
            minutes: 60.0,
            period: TaskPeriod::Week,
            scaling: TaskScaling::Linear,
        };
        assert_eq!(weekly.base_hours_per_month(), 4.0);

        let monthly = NodeTask {
            name: "Batch setup".to_string(),
            minutes: 120.0,
            period: TaskPeriod::Month,
            scaling: TaskScaling::Fixed,
        };
        assert_eq!(monthly.base_hours_per_month(), 2.0);
    }

    #[test]
    fn task_scaling_defaults_to_linear() {
        let task: NodeTask =
            toml::from_str(r#"name = "Bagging"
minutes = 30
period = "week""#)
                .expect("task without scaling");
        assert_eq!(task.scaling, TaskScaling::Linear);
    }
}

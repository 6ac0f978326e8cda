//! Per-node task breakdown for detail views. Sub-task minutes come from
//! scenario configuration; summed per node they reproduce the engine's
//! labor buckets exactly, at any household count.

use crate::diagram::types::{FlowNode, TaskScaling};
use crate::model::REFERENCE_HOUSEHOLDS;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskHours {
    pub name: String,
    pub hours_per_month: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTaskHours {
    pub node_id: String,
    pub node_label: String,
    pub tasks: Vec<TaskHours>,
    pub total: f64,
}

/// Expand every task-carrying node into scaled hours per month. Linear
/// tasks follow the household scale factor; fixed tasks are batch or
/// calendar bound and do not move.
pub fn task_breakdown(nodes: &[FlowNode], households: u32) -> Vec<NodeTaskHours> {
    let scale = households as f64 / REFERENCE_HOUSEHOLDS;

    nodes
        .iter()
        .filter(|node| !node.tasks.is_empty())
        .map(|node| {
            let tasks: Vec<TaskHours> = node
                .tasks
                .iter()
                .map(|task| {
                    let base = task.base_hours_per_month();
                    let hours = match task.scaling {
                        TaskScaling::Linear => base * scale,
                        TaskScaling::Fixed => base,
                    };
                    TaskHours {
                        name: task.name.clone(),
                        hours_per_month: hours,
                    }
                })
                .collect();
            let total = tasks.iter().map(|t| t.hours_per_month).sum();

            NodeTaskHours {
                node_id: node.id.clone(),
                node_label: node.label.clone(),
                tasks,
                total,
            }
        })
        .collect()
}

//! Scenario configuration: the immutable node/edge catalog, default
//! parameter values and ranges, and the equipment list. Loaded once at
//! startup from TOML or YAML; a calibrated default ships embedded.

use serde::{Deserialize, Serialize};

use crate::diagram::types::FlowGraph;
use crate::model::params::{ParamLimits, ScenarioParams};

const BUILTIN_SCENARIO: &str = include_str!("../scenarios/compost_coop.toml");

/// One piece of equipment for the capital/depreciation stage. Items with
/// `optional = true` form the secondary-service add-on group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    pub category: String,
    pub cost: f64,
    pub years: f64,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub params: ScenarioParams,
    #[serde(default)]
    pub limits: ParamLimits,
    #[serde(flatten)]
    pub graph: FlowGraph,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

impl Scenario {
    /// The embedded composting co-op scenario.
    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_SCENARIO).expect("built-in scenario must parse")
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse scenario TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse scenario YAML: {}", e))
    }

    /// Load from a file, trying TOML first and YAML second.
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file: {}", e))?;

        if let Ok(scenario) = Self::from_toml(&content) {
            Ok(scenario)
        } else if let Ok(scenario) = Self::from_yaml(&content) {
            Ok(scenario)
        } else {
            Err(format!(
                "Failed to parse scenario file as TOML or YAML: {}",
                path.display()
            ))
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_parses_with_reference_defaults() {
        let scenario = Scenario::builtin();
        assert_eq!(scenario.params.households, 15);
        assert_eq!(scenario.params.compost_price, 20.0);
        assert_eq!(scenario.params.tea_price, 15.0);
        assert_eq!(scenario.params.subscription_price, 25.0);
        assert_eq!(scenario.params.giveback_per_year, 10.0);
        assert!(scenario.params.include_secondary);
    }

    #[test]
    fn builtin_edges_all_reference_existing_nodes() {
        let scenario = Scenario::builtin();
        for edge in &scenario.graph.edges {
            assert!(scenario.graph.node(&edge.from).is_some(), "{}", edge.id);
            assert!(scenario.graph.node(&edge.to).is_some(), "{}", edge.id);
        }
    }

    #[test]
    fn builtin_positions_are_normalized() {
        let scenario = Scenario::builtin();
        for node in &scenario.graph.nodes {
            assert!((0.0..=1.0).contains(&node.position[0]), "{}", node.id);
            assert!((0.0..=1.0).contains(&node.position[1]), "{}", node.id);
        }
    }

    #[test]
    fn yaml_scenario_round_trips() {
        let scenario = Scenario::builtin();
        let yaml = serde_yaml::to_string(&scenario).expect("serialize");
        let back = Scenario::from_yaml(&yaml).expect("reparse");
        assert_eq!(back.graph.nodes.len(), scenario.graph.nodes.len());
        assert_eq!(back.graph.edges.len(), scenario.graph.edges.len());
        assert_eq!(back.equipment, scenario.equipment);
    }

    #[test]
    fn optional_equipment_is_the_tea_group() {
        let scenario = Scenario::builtin();
        assert!(
            scenario
                .equipment
                .iter()
                .filter(|e| e.optional)
                .all(|e| e.category == "tea")
        );
        assert!(scenario.equipment.iter().any(|e| e.optional));
    }
}

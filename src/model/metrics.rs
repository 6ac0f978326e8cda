//! Declarative per-node metric selectors: node id -> a pure projection over
//! the derived model. Keeps the engine free of display concerns; the
//! renderer just looks the node up here.

use crate::model::engine::DerivedModel;
use crate::model::params::ScenarioParams;

pub type MetricFn = fn(&ScenarioParams, &DerivedModel) -> String;

pub const NODE_METRICS: &[(&str, MetricFn)] = &[
    ("households", metric_households),
    ("collection", metric_collection),
    ("shredding", metric_shredding),
    ("compost_bays", metric_compost_bays),
    ("sifting", metric_sifting),
    ("tea_brewery", metric_tea_brewery),
    ("bagged_compost", metric_bagged_compost),
    ("compost_tea", metric_compost_tea),
    ("delivery", metric_delivery),
    ("sales", metric_sales),
];

/// Metric line for a node, if one is declared for it.
pub fn metric_for(node_id: &str, params: &ScenarioParams, model: &DerivedModel) -> Option<String> {
    NODE_METRICS
        .iter()
        .find(|(id, _)| *id == node_id)
        .map(|(_, f)| f(params, model))
}

fn metric_households(params: &ScenarioParams, _m: &DerivedModel) -> String {
    format!("{} households", params.households)
}

fn metric_collection(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("{:.0} L/mo collected", m.inputs.total_per_month)
}

fn metric_shredding(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("{:.0} L/mo cardboard", m.inputs.cardboard_per_month)
}

fn metric_compost_bays(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("{:.0} L/mo finished", m.outputs.finished_compost_per_month)
}

fn metric_sifting(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("{:.1} L/mo sellable", m.sellable_compost_per_month)
}

fn metric_tea_brewery(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("{:.0} L/mo concentrate", m.outputs.tea_concentrate_per_month)
}

fn metric_bagged_compost(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("${:.0}/mo", m.revenue.compost)
}

fn metric_compost_tea(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("${:.0}/mo", m.revenue.tea)
}

fn metric_delivery(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("{:.1} h/mo", m.labor.delivery)
}

fn metric_sales(_p: &ScenarioParams, m: &DerivedModel) -> String {
    format!("${:.0}/mo · ${:.0}/h", m.revenue.total, m.hourly_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::engine::derive;
    use crate::scenario::Scenario;

    #[test]
    fn every_builtin_node_has_a_metric() {
        let scenario = Scenario::builtin();
        let params = ScenarioParams::default();
        let model = derive(&params, &scenario);

        for node in &scenario.graph.nodes {
            assert!(
                metric_for(&node.id, &params, &model).is_some(),
                "no metric for node {}",
                node.id
            );
        }
    }

    #[test]
    fn unknown_node_yields_no_metric() {
        let scenario = Scenario::builtin();
        let params = ScenarioParams::default();
        let model = derive(&params, &scenario);
        assert!(metric_for("wormery", &params, &model).is_none());
    }

    #[test]
    fn sales_metric_reflects_the_reference_totals() {
        let scenario = Scenario::builtin();
        let params = ScenarioParams::default();
        let model = derive(&params, &scenario);
        let line = metric_for("sales", &params, &model).expect("sales metric");
        assert!(line.contains("$4425/mo"), "got {line}");
    }
}

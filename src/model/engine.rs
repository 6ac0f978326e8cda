//! The eight-stage derived-model pipeline. Stages are strictly ordered:
//! each consumes raw parameters plus earlier stages' outputs, nothing else.

use crate::model::params::ScenarioParams;
use crate::model::tasks::{self, NodeTaskHours};
use crate::model::{REFERENCE_HOUSEHOLDS, WEEKS_PER_MONTH};
use crate::scenario::{Equipment, Scenario};

/// Litres of flattened cardboard one household sets out per week.
pub const CARDBOARD_L_PER_HOUSEHOLD_WEEK: f64 = 6.0;
/// Litres of food scraps one household sets out per week.
pub const FOOD_WASTE_L_PER_HOUSEHOLD_WEEK: f64 = 2.0;

/// Monthly input volume at the reference household count.
pub const REFERENCE_INPUT_L_PER_MONTH: f64 = 480.0;
/// Finished compost the reference input yields per month.
pub const REFERENCE_COMPOST_L_PER_MONTH: f64 = 200.0;
/// Tea concentrate brewed per month at the reference output volume.
pub const REFERENCE_TEA_CONCENTRATE_L_PER_MONTH: f64 = 20.0;
/// Concentrate is diluted 1:10 before use.
pub const TEA_DILUTION_RATIO: f64 = 10.0;

/// Monthly labor hours per bucket at the reference household count.
pub const BASE_COLLECTION_HOURS: f64 = 12.0;
pub const BASE_COMPOSTING_HOURS: f64 = 10.0;
pub const BASE_SIFTING_HOURS: f64 = 6.0;
pub const BASE_BREWING_HOURS: f64 = 4.0;
pub const BASE_DELIVERY_HOURS: f64 = 8.4;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputVolumes {
    pub cardboard_per_week: f64,
    pub food_waste_per_week: f64,
    pub cardboard_per_month: f64,
    pub food_waste_per_month: f64,
    pub total_per_month: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputVolumes {
    pub finished_compost_per_month: f64,
    pub tea_concentrate_per_month: f64,
    pub tea_diluted_per_month: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Revenue {
    pub subscriptions: f64,
    pub compost: f64,
    pub tea: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Labor {
    pub collection: f64,
    pub composting: f64,
    pub sifting: f64,
    pub brewing: f64,
    pub delivery: f64,
    pub total: f64,
}

/// Equipment cost and straight-line depreciation, grouped by category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Capital {
    pub by_category: Vec<(String, f64)>,
    pub total_cost: f64,
    pub annual_depreciation: f64,
}

/// Simple annualized view: twelve months of the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Projection {
    pub revenue: f64,
    pub labor_hours: f64,
    pub depreciation: f64,
    pub net: f64,
}

/// The complete output of one recomputation. Never partially patched.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedModel {
    pub inputs: InputVolumes,
    pub outputs: OutputVolumes,
    pub sellable_compost_per_month: f64,
    pub revenue: Revenue,
    pub labor: Labor,
    pub hourly_rate: f64,
    pub task_breakdown: Vec<NodeTaskHours>,
    pub capital: Capital,
    pub annual: Projection,
}

/// Stage 1: input volumes, linear in household count.
pub fn input_volumes(households: u32) -> InputVolumes {
    let hh = households as f64;
    let cardboard_per_week = hh * CARDBOARD_L_PER_HOUSEHOLD_WEEK;
    let food_waste_per_week = hh * FOOD_WASTE_L_PER_HOUSEHOLD_WEEK;
    let cardboard_per_month = cardboard_per_week * WEEKS_PER_MONTH;
    let food_waste_per_month = food_waste_per_week * WEEKS_PER_MONTH;

    InputVolumes {
        cardboard_per_week,
        food_waste_per_week,
        cardboard_per_month,
        food_waste_per_month,
        total_per_month: cardboard_per_month + food_waste_per_month,
    }
}

/// Stage 2: output volumes via the fixed conversion ratio, calibrated so
/// the reference input yields the reference finished volume.
pub fn output_volumes(inputs: &InputVolumes) -> OutputVolumes {
    let finished =
        inputs.total_per_month * (REFERENCE_COMPOST_L_PER_MONTH / REFERENCE_INPUT_L_PER_MONTH);
    let concentrate = REFERENCE_TEA_CONCENTRATE_L_PER_MONTH
        * (finished / REFERENCE_COMPOST_L_PER_MONTH);

    OutputVolumes {
        finished_compost_per_month: finished,
        tea_concentrate_per_month: concentrate,
        tea_diluted_per_month: concentrate * TEA_DILUTION_RATIO,
    }
}

/// Stage 3: finished output minus the monthly give-back, floored at zero.
pub fn sellable_output(finished_per_month: f64, households: u32, giveback_per_year: f64) -> f64 {
    let giveback_per_month = households as f64 * giveback_per_year / 12.0;
    (finished_per_month - giveback_per_month).max(0.0)
}

/// Stage 4: three independent revenue streams and their exact sum.
pub fn revenue(params: &ScenarioParams, sellable: f64, concentrate: f64) -> Revenue {
    let subscriptions = params.households as f64 * params.subscription_price;
    let compost = sellable * params.compost_price;
    let tea = concentrate * params.tea_price;

    Revenue {
        subscriptions,
        compost,
        tea,
        total: subscriptions + compost + tea,
    }
}

/// Stage 5: five labor buckets against `scale = households / reference`.
/// Composting and brewing run at half sensitivity: batch work that does not
/// shrink to zero with an empty roster.
pub fn labor(households: u32) -> Labor {
    let scale = households as f64 / REFERENCE_HOUSEHOLDS;
    let half = 0.5 + 0.5 * scale;

    let collection = BASE_COLLECTION_HOURS * scale;
    let composting = BASE_COMPOSTING_HOURS * half;
    let sifting = BASE_SIFTING_HOURS * scale;
    let brewing = BASE_BREWING_HOURS * half;
    let delivery = BASE_DELIVERY_HOURS * scale;

    Labor {
        collection,
        composting,
        sifting,
        brewing,
        delivery,
        total: collection + composting + sifting + brewing + delivery,
    }
}

/// Stage 6: revenue per labor hour, defined as exactly zero when there are
/// no labor hours.
pub fn hourly_rate(total_revenue: f64, total_labor_hours: f64) -> f64 {
    if total_labor_hours == 0.0 {
        0.0
    } else {
        total_revenue / total_labor_hours
    }
}

/// Stage 8: itemized equipment cost and straight-line depreciation. The
/// optional group (tea add-on) is only counted when the flag is set.
pub fn capital(equipment: &[Equipment], include_secondary: bool) -> Capital {
    let mut by_category: Vec<(String, f64)> = Vec::new();
    let mut total_cost = 0.0;
    let mut annual_depreciation = 0.0;

    for item in equipment {
        if item.optional && !include_secondary {
            continue;
        }
        total_cost += item.cost;
        if item.years > 0.0 {
            annual_depreciation += item.cost / item.years;
        }
        match by_category.iter_mut().find(|(c, _)| *c == item.category) {
            Some((_, sum)) => *sum += item.cost,
            None => by_category.push((item.category.clone(), item.cost)),
        }
    }

    Capital {
        by_category,
        total_cost,
        annual_depreciation,
    }
}

/// Run the whole pipeline for one parameter set against one scenario.
pub fn derive(params: &ScenarioParams, scenario: &Scenario) -> DerivedModel {
    let inputs = input_volumes(params.households);
    let outputs = output_volumes(&inputs);
    let sellable = sellable_output(
        outputs.finished_compost_per_month,
        params.households,
        params.giveback_per_year,
    );
    let revenue = revenue(params, sellable, outputs.tea_concentrate_per_month);
    let labor = labor(params.households);
    let hourly_rate = hourly_rate(revenue.total, labor.total);
    let task_breakdown = tasks::task_breakdown(&scenario.graph.nodes, params.households);
    let capital = capital(&scenario.equipment, params.include_secondary);
    let annual = Projection {
        revenue: revenue.total * 12.0,
        labor_hours: labor.total * 12.0,
        depreciation: capital.annual_depreciation,
        net: revenue.total * 12.0 - capital.annual_depreciation,
    };

    DerivedModel {
        inputs,
        outputs,
        sellable_compost_per_month: sellable,
        revenue,
        labor,
        hourly_rate,
        task_breakdown,
        capital,
        annual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use proptest::prelude::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn input_volumes_are_linear_in_households() {
        let zero = input_volumes(0);
        assert_eq!(zero.cardboard_per_week, 0.0);
        assert_eq!(zero.food_waste_per_week, 0.0);
        assert_eq!(zero.total_per_month, 0.0);

        let one = input_volumes(10);
        let two = input_volumes(20);
        assert_eq!(one.cardboard_per_week, 60.0);
        assert_eq!(one.food_waste_per_week, 20.0);
        assert_eq!(two.cardboard_per_week, one.cardboard_per_week * 2.0);
        assert_eq!(two.food_waste_per_week, one.food_waste_per_week * 2.0);
    }

    #[test]
    fn output_volumes_are_linear_in_input() {
        let single = output_volumes(&input_volumes(15));
        let double = output_volumes(&input_volumes(30));
        assert!(close(
            double.finished_compost_per_month,
            single.finished_compost_per_month * 2.0,
            1e-9
        ));
    }

    #[test]
    fn giveback_cannot_drive_sellable_negative() {
        assert_eq!(sellable_output(10.0, 100, 500.0), 0.0);
        assert_eq!(sellable_output(0.0, 0, 0.0), 0.0);
    }

    #[test]
    fn hourly_rate_is_zero_for_zero_labor() {
        assert_eq!(hourly_rate(4375.0, 0.0), 0.0);
        assert_eq!(hourly_rate(0.0, 0.0), 0.0);
    }

    #[test]
    fn zeroing_one_price_zeroes_only_that_stream() {
        let params = ScenarioParams {
            tea_price: 0.0,
            ..ScenarioParams::default()
        };
        let rev = revenue(&params, 187.5, 20.0);
        assert_eq!(rev.tea, 0.0);
        assert_eq!(rev.subscriptions, 375.0);
        assert_eq!(rev.compost, 3750.0);
        assert_eq!(rev.total, rev.subscriptions + rev.compost);
    }

    #[test]
    fn capital_flag_excludes_only_the_optional_group() {
        let scenario = Scenario::builtin();
        let with = capital(&scenario.equipment, true);
        let without = capital(&scenario.equipment, false);

        assert!(with.total_cost > without.total_cost);
        assert!(with.annual_depreciation > without.annual_depreciation);
        assert!(without.by_category.iter().all(|(c, _)| c != "tea"));
        assert!(with.by_category.iter().any(|(c, _)| c == "tea"));
    }

    #[test]
    fn reference_case_matches_calibration() {
        let scenario = Scenario::builtin();
        let params = ScenarioParams::default();
        let model = derive(&params, &scenario);

        assert_eq!(model.inputs.cardboard_per_month, 360.0);
        assert_eq!(model.inputs.food_waste_per_month, 120.0);
        assert!(close(model.outputs.finished_compost_per_month, 200.0, 5.0));
        assert!(close(model.sellable_compost_per_month, 187.5, 1.0));
        assert_eq!(model.revenue.subscriptions, 375.0);
        assert_eq!(model.revenue.compost, 3750.0);
        assert_eq!(model.revenue.tea, 300.0);
        assert_eq!(model.revenue.total, 4425.0);
        assert!(close(model.labor.total, 40.4, 0.5));
        assert!(close(model.hourly_rate, 109.5, 5.0));
    }

    #[test]
    fn zero_households_still_carries_batch_labor() {
        let l = labor(0);
        assert_eq!(l.collection, 0.0);
        assert_eq!(l.delivery, 0.0);
        assert_eq!(l.composting, BASE_COMPOSTING_HOURS * 0.5);
        assert_eq!(l.brewing, BASE_BREWING_HOURS * 0.5);
    }

    proptest! {
        #[test]
        fn sellable_is_never_negative(
            finished in 0.0..10_000.0f64,
            households in 0u32..500,
            giveback in 0.0..1_000.0f64,
        ) {
            prop_assert!(sellable_output(finished, households, giveback) >= 0.0);
        }

        #[test]
        fn revenue_total_is_exact_sum_of_streams(
            households in 0u32..500,
            compost_price in 0.0..100.0f64,
            tea_price in 0.0..100.0f64,
            subscription_price in 0.0..100.0f64,
            sellable in 0.0..5_000.0f64,
            concentrate in 0.0..500.0f64,
        ) {
            let params = ScenarioParams {
                households,
                compost_price,
                tea_price,
                subscription_price,
                ..ScenarioParams::default()
            };
            let rev = revenue(&params, sellable, concentrate);
            prop_assert_eq!(rev.total, rev.subscriptions + rev.compost + rev.tea);
        }

        #[test]
        fn hourly_rate_is_always_finite_and_nonnegative(
            revenue in 0.0..1_000_000.0f64,
            hours in 0.0..10_000.0f64,
        ) {
            let rate = hourly_rate(revenue, hours);
            prop_assert!(rate.is_finite());
            prop_assert!(rate >= 0.0);
        }
    }
}

use serde::{Deserialize, Serialize};

/// The sole mutable input to the model engine. Reconstructed from current
/// control values on every recomputation; no persistent identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub households: u32,
    pub compost_price: f64,
    pub tea_price: f64,
    pub subscription_price: f64,
    /// Litres of finished compost returned per household per year.
    pub giveback_per_year: f64,
    /// Whether the optional tea add-on equipment is counted in capital.
    #[serde(default = "default_true")]
    pub include_secondary: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            households: 15,
            compost_price: 20.0,
            tea_price: 15.0,
            subscription_price: 25.0,
            giveback_per_year: 10.0,
            include_secondary: true,
        }
    }
}

/// `[min, max]` range per lever, from scenario configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamLimits {
    pub households: [f64; 2],
    pub compost_price: [f64; 2],
    pub tea_price: [f64; 2],
    pub subscription_price: [f64; 2],
    pub giveback_per_year: [f64; 2],
}

impl Default for ParamLimits {
    fn default() -> Self {
        Self {
            households: [0.0, 200.0],
            compost_price: [0.0, 100.0],
            tea_price: [0.0, 100.0],
            subscription_price: [0.0, 100.0],
            giveback_per_year: [0.0, 60.0],
        }
    }
}

/// One raw control edit. Applying a change to a previous parameter set is
/// the only way a set evolves; there is no shared mutable model object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamChange {
    Households(f64),
    CompostPrice(f64),
    TeaPrice(f64),
    SubscriptionPrice(f64),
    GivebackPerYear(f64),
    IncludeSecondary(bool),
}

impl ScenarioParams {
    /// `(previous, raw input) -> next`: clamp the raw value into its
    /// configured range and produce a new set. Non-finite input falls back
    /// to the range minimum. Households are rounded to a whole count.
    pub fn apply(self, change: ParamChange, limits: &ParamLimits) -> Self {
        let mut next = self;
        match change {
            ParamChange::Households(raw) => {
                next.households = clamp(raw, limits.households).round() as u32;
            }
            ParamChange::CompostPrice(raw) => {
                next.compost_price = clamp(raw, limits.compost_price);
            }
            ParamChange::TeaPrice(raw) => {
                next.tea_price = clamp(raw, limits.tea_price);
            }
            ParamChange::SubscriptionPrice(raw) => {
                next.subscription_price = clamp(raw, limits.subscription_price);
            }
            ParamChange::GivebackPerYear(raw) => {
                next.giveback_per_year = clamp(raw, limits.giveback_per_year);
            }
            ParamChange::IncludeSecondary(on) => {
                next.include_secondary = on;
            }
        }
        next
    }
}

fn clamp(raw: f64, range: [f64; 2]) -> f64 {
    if !raw.is_finite() {
        return range[0];
    }
    raw.max(range[0]).min(range[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_clamps_into_configured_range() {
        let limits = ParamLimits::default();
        let base = ScenarioParams::default();

        let over = base.apply(ParamChange::CompostPrice(250.0), &limits);
        assert_eq!(over.compost_price, 100.0);

        let under = base.apply(ParamChange::TeaPrice(-3.0), &limits);
        assert_eq!(under.tea_price, 0.0);

        // Untouched levers carry over.
        assert_eq!(over.households, base.households);
        assert_eq!(over.subscription_price, base.subscription_price);
    }

    #[test]
    fn households_round_to_whole_count() {
        let limits = ParamLimits::default();
        let next = ScenarioParams::default().apply(ParamChange::Households(12.6), &limits);
        assert_eq!(next.households, 13);
    }

    #[test]
    fn non_finite_input_falls_back_to_range_minimum() {
        let limits = ParamLimits::default();
        let next = ScenarioParams::default().apply(ParamChange::CompostPrice(f64::NAN), &limits);
        assert_eq!(next.compost_price, 0.0);
    }

    #[test]
    fn apply_returns_a_new_set_without_mutating_the_old() {
        let limits = ParamLimits::default();
        let base = ScenarioParams::default();
        let next = base.apply(ParamChange::IncludeSecondary(false), &limits);
        assert!(base.include_secondary);
        assert!(!next.include_secondary);
    }
}

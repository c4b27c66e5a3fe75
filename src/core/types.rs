use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationInputs {
    pub principal: f64,
    pub monthly_contribution: f64,
    pub annual_return_rate: f64,
    pub annual_inflation_rate: f64,
    pub annual_expenses: f64,
    pub safe_withdrawal_rate: f64,
    pub horizon_years: u32,
}

/// Outcome of the month-by-month FI search.
///
/// `months_to_reach` is `None` when the balance never met the target within
/// the simulated horizon; the values are then the ones at the last month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonResult {
    pub months_to_reach: Option<u32>,
    pub target_at_hit: f64,
    pub balance_at_hit: f64,
}

impl HorizonResult {
    pub fn is_reached(&self) -> bool {
        self.months_to_reach.is_some()
    }

    pub fn years_to_fi(&self) -> Option<f64> {
        self.months_to_reach.map(|months| months as f64 / 12.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub year_label: String,
    pub portfolio_value: Option<f64>,
    pub target_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub annual_expenses: f64,
    pub fi_target_today: f64,
    pub max_horizon_years: u32,
    pub horizon: HorizonResult,
    pub years_to_fi: Option<f64>,
    pub target_years: u32,
    pub future_target_at_target_years: f64,
    pub required_monthly_contribution: f64,
    pub series: Vec<SeriesPoint>,
}

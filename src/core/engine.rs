use super::types::{HorizonResult, SeriesPoint, SimulationInputs};

/// Denominator used in place of a safe withdrawal rate of exactly zero.
pub const SWR_EPSILON: f64 = 1e-6;

pub const DEFAULT_MAX_HORIZON_YEARS: u32 = 80;

const MONTHS_PER_YEAR: u32 = 12;

// Upper bound on the up-front series allocation; longer series grow on push.
const MAX_PREALLOCATED_POINTS: usize = 1_024;

/// Constant end-of-period payment that grows `present_value` into
/// `future_target` after `period_count` periods at `periodic_rate`.
///
/// Never negative. When `(1 + r)^n` overflows the n -> infinity limit
/// `max(0, -present_value * r)` is returned; any other non-finite result
/// collapses to zero.
pub fn required_payment(
    present_value: f64,
    future_target: f64,
    periodic_rate: f64,
    period_count: i64,
) -> f64 {
    if period_count <= 0 {
        return 0.0;
    }
    let periods = period_count as f64;

    if periodic_rate == 0.0 {
        return finite_or_zero(((future_target - present_value) / periods).max(0.0));
    }

    let growth = (1.0 + periodic_rate).powf(periods);
    if growth.is_infinite() {
        return finite_or_zero((-present_value * periodic_rate).max(0.0));
    }

    let numerator = future_target - present_value * growth;
    let annuity_factor = (growth - 1.0) / periodic_rate;
    finite_or_zero((numerator / annuity_factor).max(0.0))
}

/// Portfolio size whose withdrawals at `safe_withdrawal_rate` cover
/// `annual_expenses`.
pub fn fi_target(annual_expenses: f64, safe_withdrawal_rate: f64) -> f64 {
    annual_expenses / guarded_withdrawal_rate(safe_withdrawal_rate)
}

/// First month at which the projected balance meets the inflation-indexed
/// FI target, searching at most `max_horizon_years * 12` months.
pub fn time_to_fi(inputs: &SimulationInputs, max_horizon_years: u32) -> HorizonResult {
    let mut projection = Projection::new(inputs);
    let months = max_horizon_years.saturating_mul(MONTHS_PER_YEAR);

    for month in 1..=months {
        projection.step();
        if !projection.is_finite() {
            break;
        }
        if projection.balance >= projection.target {
            return HorizonResult {
                months_to_reach: Some(month),
                target_at_hit: projection.target,
                balance_at_hit: projection.balance,
            };
        }
    }

    HorizonResult {
        months_to_reach: None,
        target_at_hit: projection.target,
        balance_at_hit: projection.balance,
    }
}

/// Yearly snapshots of the same projection `time_to_fi` runs, always
/// `years + 1` points long.
pub fn series(inputs: &SimulationInputs, years: u32) -> Vec<SeriesPoint> {
    let mut projection = Projection::new(inputs);
    let mut points = Vec::with_capacity(series_capacity(years));
    points.push(projection.snapshot(0));

    for year in 1..=years {
        for _ in 0..MONTHS_PER_YEAR {
            projection.step();
        }
        points.push(projection.snapshot(year));
    }
    points
}

fn series_capacity(years: u32) -> usize {
    (years as usize)
        .saturating_add(1)
        .min(MAX_PREALLOCATED_POINTS)
}

pub fn year_label(years: u32) -> String {
    if years == 1 {
        "1 an".to_string()
    } else {
        format!("{years} ans")
    }
}

fn guarded_withdrawal_rate(rate: f64) -> f64 {
    if rate == 0.0 || rate.is_nan() {
        SWR_EPSILON
    } else {
        rate
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn finite_or_missing(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

// Monthly rates are the annual rate divided by 12, not the compounded root.
#[derive(Debug, Clone, Copy)]
struct Projection {
    balance: f64,
    target: f64,
    monthly_return: f64,
    monthly_inflation: f64,
    monthly_contribution: f64,
}

impl Projection {
    fn new(inputs: &SimulationInputs) -> Self {
        Self {
            balance: inputs.principal,
            target: fi_target(inputs.annual_expenses, inputs.safe_withdrawal_rate),
            monthly_return: inputs.annual_return_rate / MONTHS_PER_YEAR as f64,
            monthly_inflation: inputs.annual_inflation_rate / MONTHS_PER_YEAR as f64,
            monthly_contribution: inputs.monthly_contribution,
        }
    }

    fn step(&mut self) {
        self.balance = self.balance * (1.0 + self.monthly_return) + self.monthly_contribution;
        self.target *= 1.0 + self.monthly_inflation;
    }

    fn is_finite(&self) -> bool {
        self.balance.is_finite() && self.target.is_finite()
    }

    fn snapshot(&self, year: u32) -> SeriesPoint {
        SeriesPoint {
            year_label: year_label(year),
            portfolio_value: finite_or_missing(self.balance),
            target_value: finite_or_missing(self.target),
        }
    }
}

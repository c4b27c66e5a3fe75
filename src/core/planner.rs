use super::engine::{DEFAULT_MAX_HORIZON_YEARS, fi_target, required_payment, series, time_to_fi};
use super::input::{FieldScale, FieldSpec, NumberField};
use super::types::{PlanSummary, SimulationInputs};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PlanField {
    Principal,
    MonthlyContribution,
    AnnualReturnRate,
    AnnualInflationRate,
    SafeWithdrawalRate,
    MonthlyExpenses,
    HorizonYears,
    TargetYears,
}

impl PlanField {
    pub const ALL: [PlanField; 8] = [
        PlanField::Principal,
        PlanField::MonthlyContribution,
        PlanField::AnnualReturnRate,
        PlanField::AnnualInflationRate,
        PlanField::SafeWithdrawalRate,
        PlanField::MonthlyExpenses,
        PlanField::HorizonYears,
        PlanField::TargetYears,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PlanField::Principal => "principal",
            PlanField::MonthlyContribution => "monthlyContribution",
            PlanField::AnnualReturnRate => "annualReturnRate",
            PlanField::AnnualInflationRate => "annualInflationRate",
            PlanField::SafeWithdrawalRate => "safeWithdrawalRate",
            PlanField::MonthlyExpenses => "monthlyExpenses",
            PlanField::HorizonYears => "horizonYears",
            PlanField::TargetYears => "targetYears",
        }
    }

    pub fn spec(self) -> FieldSpec {
        match self {
            PlanField::Principal => FieldSpec::new(0.0, 1_000_000.0, FieldScale::Money),
            PlanField::MonthlyContribution => FieldSpec::new(0.0, 50_000.0, FieldScale::Money),
            PlanField::AnnualReturnRate => FieldSpec::new(0.0, 1.0, FieldScale::Percent),
            PlanField::AnnualInflationRate => FieldSpec::new(0.0, 0.2, FieldScale::Percent),
            PlanField::SafeWithdrawalRate => FieldSpec::new(0.01, 0.1, FieldScale::Percent),
            PlanField::MonthlyExpenses => FieldSpec::new(0.0, 50_000.0, FieldScale::Money),
            PlanField::HorizonYears | PlanField::TargetYears => {
                FieldSpec::new(1.0, 80.0, FieldScale::WholeYears)
            }
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            PlanField::Principal => 18_486.05,
            PlanField::MonthlyContribution => 300.0,
            PlanField::AnnualReturnRate => 0.06,
            PlanField::AnnualInflationRate => 0.02,
            PlanField::SafeWithdrawalRate => 0.04,
            PlanField::MonthlyExpenses => 1_500.0,
            PlanField::HorizonYears => 30.0,
            PlanField::TargetYears => 15.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Current planner state: one editable input per field. Every derived figure
/// is recomputed from the committed values on request.
#[derive(Debug, Clone, PartialEq)]
pub struct Planner {
    fields: [NumberField; 8],
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            fields: PlanField::ALL.map(|field| NumberField::new(field.spec(), field.default_value())),
        }
    }
}

impl Planner {
    pub fn field(&self, field: PlanField) -> &NumberField {
        &self.fields[field.index()]
    }

    pub fn value(&self, field: PlanField) -> f64 {
        self.field(field).value()
    }

    pub fn edit(&mut self, field: PlanField, raw: &str) {
        self.fields[field.index()].edit(raw);
    }

    pub fn commit(&mut self, field: PlanField) -> bool {
        self.fields[field.index()].commit()
    }

    /// Edits and commits in one step, as a form submit does.
    pub fn submit(&mut self, field: PlanField, raw: &str) -> bool {
        self.edit(field, raw);
        self.commit(field)
    }

    pub fn set_value(&mut self, field: PlanField, value: f64) {
        self.fields[field.index()].set_value(value);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn annual_expenses(&self) -> f64 {
        self.value(PlanField::MonthlyExpenses) * 12.0
    }

    pub fn fi_target_today(&self) -> f64 {
        fi_target(self.annual_expenses(), self.value(PlanField::SafeWithdrawalRate))
    }

    pub fn horizon_years(&self) -> u32 {
        whole_years(self.value(PlanField::HorizonYears))
    }

    pub fn target_years(&self) -> u32 {
        whole_years(self.value(PlanField::TargetYears))
    }

    pub fn simulation_inputs(&self) -> SimulationInputs {
        SimulationInputs {
            principal: self.value(PlanField::Principal),
            monthly_contribution: self.value(PlanField::MonthlyContribution),
            annual_return_rate: self.value(PlanField::AnnualReturnRate),
            annual_inflation_rate: self.value(PlanField::AnnualInflationRate),
            annual_expenses: self.annual_expenses(),
            safe_withdrawal_rate: self.value(PlanField::SafeWithdrawalRate),
            horizon_years: self.horizon_years(),
        }
    }

    /// FI target today, compounded at the inflation rate over the target
    /// horizon.
    pub fn future_target_at_target_years(&self) -> f64 {
        let inflation = self.value(PlanField::AnnualInflationRate);
        self.fi_target_today() * (1.0 + inflation).powi(self.target_years() as i32)
    }

    pub fn required_monthly_contribution(&self) -> f64 {
        let target_years = self.target_years();
        required_payment(
            self.value(PlanField::Principal),
            self.future_target_at_target_years(),
            self.value(PlanField::AnnualReturnRate) / 12.0,
            i64::from(target_years) * 12,
        )
    }

    pub fn summary(&self) -> PlanSummary {
        let inputs = self.simulation_inputs();
        let horizon = time_to_fi(&inputs, DEFAULT_MAX_HORIZON_YEARS);
        let summary = PlanSummary {
            annual_expenses: inputs.annual_expenses,
            fi_target_today: self.fi_target_today(),
            max_horizon_years: DEFAULT_MAX_HORIZON_YEARS,
            horizon,
            years_to_fi: horizon.years_to_fi(),
            target_years: self.target_years(),
            future_target_at_target_years: self.future_target_at_target_years(),
            required_monthly_contribution: self.required_monthly_contribution(),
            series: series(&inputs, inputs.horizon_years),
        };

        tracing::debug!(
            fi_target_today = summary.fi_target_today,
            months_to_fi = ?summary.horizon.months_to_reach,
            required_monthly_contribution = summary.required_monthly_contribution,
            points = summary.series.len(),
            "plan recomputed"
        );
        summary
    }
}

fn whole_years(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

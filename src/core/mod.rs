mod engine;
mod format;
mod input;
mod planner;
mod types;

pub use engine::{
    DEFAULT_MAX_HORIZON_YEARS, SWR_EPSILON, fi_target, required_payment, series, time_to_fi,
    year_label,
};
pub use format::{format_currency, format_percent, format_years_to_fi};
pub use input::{FieldScale, FieldSpec, NumberField};
pub use planner::{PlanField, Planner};
pub use types::{HorizonResult, PlanSummary, SeriesPoint, SimulationInputs};

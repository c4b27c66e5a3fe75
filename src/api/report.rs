use crate::core::{
    PlanField, PlanSummary, Planner, format_currency, format_percent, format_years_to_fi,
};

const REPORT_STYLE: &str = "<style>
  body { font-family: Arial, sans-serif; padding: 16px; }
  h1 { font-size: 20px; margin: 0 0 12px; }
  table { border-collapse: collapse; width: 100%; margin-top: 12px; }
  th, td { border: 1px solid #ddd; padding: 6px 8px; font-size: 12px; }
  th { background: #f3f4f6; text-align: left; }
  .kpi { margin-bottom: 8px; }
</style>";

/// Printable HTML report of the current plan: the inputs, the KPIs and the
/// yearly series table.
pub fn render_report(planner: &Planner, summary: &PlanSummary) -> String {
    let target_years = summary.target_years;
    let kpis = [
        (
            "Valeur actuelle".to_string(),
            format_currency(planner.value(PlanField::Principal)),
        ),
        (
            "Apport mensuel".to_string(),
            format_currency(planner.value(PlanField::MonthlyContribution)),
        ),
        (
            "Rendement annuel".to_string(),
            format_percent(planner.value(PlanField::AnnualReturnRate)),
        ),
        (
            "Inflation annuelle".to_string(),
            format_percent(planner.value(PlanField::AnnualInflationRate)),
        ),
        (
            "SWR".to_string(),
            format_percent(planner.value(PlanField::SafeWithdrawalRate)),
        ),
        (
            "Dépenses mensuelles".to_string(),
            format_currency(planner.value(PlanField::MonthlyExpenses)),
        ),
        (
            "Horizon".to_string(),
            format!("{} ans", planner.horizon_years()),
        ),
        ("Objectif FI".to_string(), format!("{target_years} ans")),
        (
            "Cible FI (aujourd’hui)".to_string(),
            format_currency(summary.fi_target_today),
        ),
        (
            format!("Mensualité requise ({target_years} ans)"),
            format_currency(summary.required_monthly_contribution.round()),
        ),
        (
            "Temps estimé jusqu’à FI".to_string(),
            format_years_to_fi(summary.years_to_fi, summary.max_horizon_years),
        ),
    ];

    let mut html = String::new();
    html.push_str("<html><head><meta charset=\"utf-8\">");
    html.push_str(REPORT_STYLE);
    html.push_str("</head><body>\n<h1>Rapport de simulation FI</h1>\n");
    for (label, value) in &kpis {
        html.push_str(&format!(
            "<div class=\"kpi\"><strong>{}:</strong> {}</div>\n",
            escape_html(label),
            escape_html(value)
        ));
    }

    html.push_str("<table>\n<thead><tr><th>Année</th><th>Portefeuille</th><th>Cible FI (inflation)</th></tr></thead>\n<tbody>\n");
    for point in &summary.series {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&point.year_label),
            money_cell(point.portfolio_value),
            money_cell(point.target_value)
        ));
    }
    html.push_str("</tbody>\n</table>\n</body></html>\n");
    html
}

fn money_cell(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_default()
}

fn escape_html(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldScale {
    Money,
    /// Stored as a fraction, edited and displayed in percent.
    Percent,
    WholeYears,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub min: f64,
    pub max: f64,
    pub scale: FieldScale,
}

impl FieldSpec {
    pub const fn new(min: f64, max: f64, scale: FieldScale) -> Self {
        Self { min, max, scale }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        match self.scale {
            FieldScale::WholeYears => value.round(),
            FieldScale::Money | FieldScale::Percent => value,
        }
    }

    /// Parses user text in display units. Accepts a comma decimal separator;
    /// empty or non-finite input yields `None`.
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let normalized = raw.trim().replace(',', ".");
        if normalized.is_empty() {
            return None;
        }
        let parsed = normalized.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(match self.scale {
            FieldScale::Percent => parsed / 100.0,
            FieldScale::Money | FieldScale::WholeYears => parsed,
        })
    }

    pub fn display(&self, value: f64) -> String {
        match self.scale {
            FieldScale::Money => format!("{}", round_to(value, 1e6)),
            FieldScale::Percent => {
                let pct = round_to(value * 100.0, 1e6);
                if (pct * 10.0).fract() == 0.0 {
                    format!("{pct:.1}")
                } else {
                    format!("{pct}")
                }
            }
            FieldScale::WholeYears => format!("{}", value.round() as i64),
        }
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

/// One editable numeric input: the raw text the user is typing plus the last
/// validated value. The value is always within the field's bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberField {
    spec: FieldSpec,
    value: f64,
    text: String,
}

impl NumberField {
    pub fn new(spec: FieldSpec, value: f64) -> Self {
        let value = spec.clamp(value);
        Self {
            spec,
            value,
            text: spec.display(value),
        }
    }

    pub fn spec(&self) -> FieldSpec {
        self.spec
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Keystroke-level edit: keeps the text verbatim and only moves the value
    /// when the text currently parses.
    pub fn edit(&mut self, raw: &str) {
        self.text = raw.to_string();
        if let Some(parsed) = self.spec.parse(raw) {
            self.value = self.spec.clamp(parsed);
        }
    }

    /// Reconciles text and value. Returns `false` when the text did not parse,
    /// in which case the previous value is kept.
    pub fn commit(&mut self) -> bool {
        let parsed = self.spec.parse(&self.text);
        if let Some(value) = parsed {
            self.value = self.spec.clamp(value);
        }
        self.text = self.spec.display(self.value);
        parsed.is_some()
    }

    pub fn set_value(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.value = self.spec.clamp(value);
        self.text = self.spec.display(self.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONEY: FieldSpec = FieldSpec::new(0.0, 50_000.0, FieldScale::Money);
    const PERCENT: FieldSpec = FieldSpec::new(0.0, 0.2, FieldScale::Percent);
    const YEARS: FieldSpec = FieldSpec::new(1.0, 80.0, FieldScale::WholeYears);

    #[test]
    fn new_clamps_and_formats() {
        let field = NumberField::new(MONEY, 90_000.0);
        assert_eq!(field.value(), 50_000.0);
        assert_eq!(field.text(), "50000");

        let field = NumberField::new(PERCENT, 0.02);
        assert_eq!(field.text(), "2.0");

        let field = NumberField::new(YEARS, 0.0);
        assert_eq!(field.value(), 1.0);
        assert_eq!(field.text(), "1");
    }

    #[test]
    fn edit_keeps_empty_text_without_touching_value() {
        let mut field = NumberField::new(MONEY, 300.0);
        field.edit("");
        assert_eq!(field.text(), "");
        assert_eq!(field.value(), 300.0);
    }

    #[test]
    fn edit_accepts_comma_decimal_separator() {
        let mut field = NumberField::new(MONEY, 300.0);
        field.edit("1234,5");
        assert_eq!(field.text(), "1234,5");
        assert_eq!(field.value(), 1234.5);
    }

    #[test]
    fn edit_clamps_value_but_keeps_raw_text() {
        let mut field = NumberField::new(MONEY, 300.0);
        field.edit("75000");
        assert_eq!(field.text(), "75000");
        assert_eq!(field.value(), 50_000.0);
    }

    #[test]
    fn commit_rewrites_text_to_canonical_form() {
        let mut field = NumberField::new(MONEY, 300.0);
        field.edit(" 75000 ");
        assert!(field.commit());
        assert_eq!(field.text(), "50000");
        assert_eq!(field.value(), 50_000.0);
    }

    #[test]
    fn commit_restores_previous_value_on_garbage() {
        let mut field = NumberField::new(MONEY, 300.0);
        field.edit("12abc");
        assert!(!field.commit());
        assert_eq!(field.text(), "300");
        assert_eq!(field.value(), 300.0);
    }

    #[test]
    fn commit_rejects_non_finite_text() {
        let mut field = NumberField::new(MONEY, 300.0);
        field.edit("inf");
        assert!(!field.commit());
        assert_eq!(field.value(), 300.0);
    }

    #[test]
    fn percent_fields_parse_and_display_in_percent() {
        let mut field = NumberField::new(PERCENT, 0.02);
        field.edit("2,5");
        assert!((field.value() - 0.025).abs() < 1e-12);
        assert!(field.commit());
        assert_eq!(field.text(), "2.5");

        field.edit("3.25");
        assert!(field.commit());
        assert_eq!(field.text(), "3.25");

        field.edit("7");
        assert!(field.commit());
        assert_eq!(field.text(), "7.0");
    }

    #[test]
    fn whole_year_fields_round() {
        let mut field = NumberField::new(YEARS, 30.0);
        field.edit("12.6");
        assert!(field.commit());
        assert_eq!(field.value(), 13.0);
        assert_eq!(field.text(), "13");
    }

    #[test]
    fn set_value_updates_both_representations() {
        let mut field = NumberField::new(PERCENT, 0.02);
        field.set_value(0.5);
        assert_eq!(field.value(), 0.2);
        assert_eq!(field.text(), "20.0");

        field.set_value(f64::NAN);
        assert_eq!(field.value(), 0.2);
    }
}

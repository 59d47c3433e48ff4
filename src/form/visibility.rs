//! Conditional visibility.
//!
//! A field without a conditional is always visible. A conditional field is
//! visible iff the referenced field's current value is strictly equal to the
//! conditional value; an undefined value never matches.

use crate::form::field::FieldDescriptor;
use crate::form::value::FormValues;

/// Whether `field` is visible given `values`.
pub fn is_visible(field: &FieldDescriptor, values: &FormValues) -> bool {
    match &field.conditional {
        None => true,
        Some(cond) => values.get(&cond.field) == Some(&cond.value),
    }
}

/// Visibility of every field, in descriptor order.
pub fn evaluate(fields: &[FieldDescriptor], values: &FormValues) -> Vec<bool> {
    fields.iter().map(|f| is_visible(f, values)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::FieldType;
    use crate::form::value::FieldValue;

    fn country_form() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("country", "Country", FieldType::Select)
                .options([("us", "United States"), ("other", "Other")]),
            FieldDescriptor::new("other_country", "Which country?", FieldType::Text)
                .show_when("country", "other"),
        ]
    }

    #[test]
    fn unconditional_fields_always_visible() {
        let fields = vec![
            FieldDescriptor::new("a", "A", FieldType::Text),
            FieldDescriptor::new("b", "B", FieldType::Checkbox),
        ];
        assert_eq!(evaluate(&fields, &FormValues::new()), vec![true, true]);
    }

    #[test]
    fn conditional_follows_value_sequence() {
        let fields = country_form();
        let mut values = FormValues::new();
        assert_eq!(evaluate(&fields, &values), vec![true, false]);

        for (country, shown) in [("us", false), ("other", true), ("us", false)] {
            values.set("country", country);
            assert_eq!(is_visible(&fields[1], &values), shown, "country = {country}");
        }
    }

    #[test]
    fn equality_is_strict() {
        let field = FieldDescriptor::new("x", "X", FieldType::Text).show_when("n", 1_i64);
        let mut values = FormValues::new();
        values.set("n", "1");
        assert!(!is_visible(&field, &values));
        values.set("n", FieldValue::Number(1));
        assert!(is_visible(&field, &values));
    }

    #[test]
    fn boolean_conditionals() {
        let field = FieldDescriptor::new("company", "Company", FieldType::Text).show_when("business", true);
        let mut values = FormValues::new();
        values.set("business", false);
        assert!(!is_visible(&field, &values));
        values.set("business", true);
        assert!(is_visible(&field, &values));
    }
}

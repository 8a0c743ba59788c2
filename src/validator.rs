use crate::schema::{FieldKind, FieldSpec};
use crate::value::{FieldValue, FormErrors, FormValues, format_number, is_empty_value};
use crate::visibility::is_visible;

/// Checks a single field against its current value.
///
/// Returns the first failing rule's message, in this order: required, numeric
/// range (number fields only), pattern. A blank number counts as 0 for the
/// range; an absent value or unparseable text skips it.
pub fn validate_field(field: &FieldSpec, value: Option<&FieldValue>) -> Option<String> {
    if field.required && is_empty_value(value) {
        return Some(format!("{} is required", field.label));
    }

    let rules = field.validation.as_ref()?;

    if matches!(field.kind, FieldKind::Number) {
        if let Some(number) = value.and_then(parse_number) {
            if let Some(min) = rules.min {
                if number < min {
                    return Some(format!(
                        "{} must be at least {}",
                        field.label,
                        format_number(min)
                    ));
                }
            }
            if let Some(max) = rules.max {
                if number > max {
                    return Some(format!(
                        "{} must be at most {}",
                        field.label,
                        format_number(max)
                    ));
                }
            }
        }
    }

    if let (Some(pattern), Some(value)) = (&rules.pattern, value) {
        if !value.is_empty() && !pattern.is_match(&value.as_text()) {
            return Some(format!("{} format is invalid", field.label));
        }
    }

    None
}

/// Validates every visible leaf of the tree. Groups are descended, never checked themselves.
pub fn validate_form(fields: &[FieldSpec], values: &FormValues) -> FormErrors {
    let mut errors = FormErrors::new();
    validate_recursive(fields, values, &mut errors);
    errors
}

fn validate_recursive(fields: &[FieldSpec], values: &FormValues, errors: &mut FormErrors) {
    for field in fields {
        if let FieldKind::Group { children } = &field.kind {
            validate_recursive(children, values, errors);
        } else if is_visible(field, values) {
            if let Some(message) = validate_field(field, values.get(&field.id)) {
                errors.insert(field.id.clone(), message);
            }
        }
    }
}

fn parse_number(value: &FieldValue) -> Option<f64> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|n| !n.is_nan())
}

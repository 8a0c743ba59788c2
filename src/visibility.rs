use crate::schema::{Condition, FieldSpec, VisibilityRule};
use crate::value::{FieldValue, FormValues};

impl VisibilityRule {
    /// Compares the controlling field's current value against the rule's value.
    /// An absent value never equals anything.
    pub fn evaluate(&self, values: &FormValues) -> bool {
        let matches = matches!(
            values.get(&self.depends_on),
            Some(FieldValue::Text(current)) if *current == self.value
        );
        match self.condition {
            Condition::Equals => matches,
            Condition::NotEquals => !matches,
        }
    }
}

/// Whether a field is shown for the current input. Fields without a rule always are.
pub fn is_visible(field: &FieldSpec, values: &FormValues) -> bool {
    field
        .visibility
        .as_ref()
        .is_none_or(|rule| rule.evaluate(values))
}

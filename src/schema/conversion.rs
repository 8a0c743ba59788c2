use super::definition::*;
use crate::error::SchemaError;
use ahash::AHashSet;
use serde::Deserialize;

/// A trait for schema formats that can be converted into a `FormSpec`.
///
/// The JSON layout served by the insurance backend implements it through
/// `RawFormSpec`; other formats can plug in by implementing it on their own structs.
pub trait IntoFormSpec {
    /// Consumes the object and converts it into a checked form definition.
    fn into_form_spec(self) -> Result<FormSpec, SchemaError>;
}

// --- Wire format ---
// These structs mirror the backend's JSON and are only used for conversion.

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawFormSpec {
    pub form_id: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<RawField>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RawKind {
    Text,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
    Group,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: RawKind,
    #[serde(default)]
    pub required: bool,
    pub options: Option<Vec<String>>,
    pub fields: Option<Vec<RawField>>,
    pub validation: Option<RawValidation>,
    pub visibility: Option<RawVisibility>,
    pub dynamic_options: Option<RawDynamicOptions>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawValidation {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RawCondition {
    Equals,
    NotEquals,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawVisibility {
    pub depends_on: String,
    pub condition: RawCondition,
    pub value: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawDynamicOptions {
    pub depends_on: String,
    pub endpoint: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".to_string()
}

impl FormSpec {
    /// Parses a single form schema from JSON.
    pub fn from_json(json: &str) -> Result<FormSpec, SchemaError> {
        let raw: RawFormSpec =
            serde_json::from_str(json).map_err(|e| SchemaError::Json(e.to_string()))?;
        raw.into_form_spec()
    }

    /// Parses a JSON array of form schemas.
    pub fn list_from_json(json: &str) -> Result<Vec<FormSpec>, SchemaError> {
        let raw: Vec<RawFormSpec> =
            serde_json::from_str(json).map_err(|e| SchemaError::Json(e.to_string()))?;
        raw.into_iter().map(IntoFormSpec::into_form_spec).collect()
    }
}

impl IntoFormSpec for RawFormSpec {
    fn into_form_spec(self) -> Result<FormSpec, SchemaError> {
        let mut seen = AHashSet::new();
        let fields = self
            .fields
            .into_iter()
            .map(|raw| convert_field(raw, &self.form_id, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;

        let form = FormSpec {
            form_id: self.form_id,
            title: self.title,
            fields,
        };
        check_dependencies(&form, &seen)?;
        Ok(form)
    }
}

fn convert_field(
    raw: RawField,
    form_id: &str,
    seen: &mut AHashSet<String>,
) -> Result<FieldSpec, SchemaError> {
    if !seen.insert(raw.id.clone()) {
        return Err(SchemaError::DuplicateFieldId {
            form_id: form_id.to_string(),
            field_id: raw.id,
        });
    }

    let kind_name = format!("{:?}", raw.kind).to_lowercase();
    if raw.kind != RawKind::Group && raw.fields.is_some() {
        return Err(SchemaError::ChildrenOnLeaf {
            field_id: raw.id,
            kind: kind_name,
        });
    }
    if raw.kind != RawKind::Select && raw.dynamic_options.is_some() {
        return Err(SchemaError::DynamicOptionsOnNonSelect {
            field_id: raw.id,
            kind: kind_name,
        });
    }

    let options = raw.options.unwrap_or_default();
    let takes_options = matches!(
        raw.kind,
        RawKind::Select | RawKind::Radio | RawKind::Checkbox
    );
    if !takes_options && !options.is_empty() {
        log::warn!(
            "Ignoring options on field '{}' of kind '{}'",
            raw.id,
            kind_name
        );
    }

    let kind = match raw.kind {
        RawKind::Text => FieldKind::Text,
        RawKind::Number => FieldKind::Number,
        RawKind::Date => FieldKind::Date,
        RawKind::Radio => FieldKind::Radio { options },
        RawKind::Checkbox => FieldKind::Checkbox { options },
        RawKind::Select => FieldKind::Select {
            options,
            dynamic: raw.dynamic_options.map(|d| DynamicOptions {
                depends_on: d.depends_on,
                fetch: FetchDescriptor {
                    endpoint: d.endpoint,
                    method: d.method,
                },
            }),
        },
        RawKind::Group => FieldKind::Group {
            children: raw
                .fields
                .unwrap_or_default()
                .into_iter()
                .map(|child| convert_field(child, form_id, seen))
                .collect::<Result<_, _>>()?,
        },
    };

    let validation = raw
        .validation
        .map(|v| -> Result<ValidationRules, SchemaError> {
            let pattern = v
                .pattern
                .map(|source| {
                    Pattern::new(&source).map_err(|e| SchemaError::InvalidPattern {
                        field_id: raw.id.clone(),
                        pattern: source.clone(),
                        reason: e.to_string(),
                    })
                })
                .transpose()?;
            Ok(ValidationRules {
                min: v.min,
                max: v.max,
                pattern,
            })
        })
        .transpose()?;

    let visibility = raw.visibility.map(|v| VisibilityRule {
        depends_on: v.depends_on,
        condition: match v.condition {
            RawCondition::Equals => Condition::Equals,
            RawCondition::NotEquals => Condition::NotEquals,
        },
        value: v.value,
    });

    Ok(FieldSpec {
        id: raw.id,
        label: raw.label,
        required: raw.required,
        kind,
        validation,
        visibility,
    })
}

/// Every visibility rule and dynamic option source must name a field of the same form.
fn check_dependencies(form: &FormSpec, ids: &AHashSet<String>) -> Result<(), SchemaError> {
    for field in form.leaves() {
        let deps = field
            .visibility
            .as_ref()
            .map(|v| &v.depends_on)
            .into_iter()
            .chain(field.dynamic_options().map(|d| &d.depends_on));
        for depends_on in deps {
            if !ids.contains(depends_on) {
                return Err(SchemaError::UnknownDependency {
                    field_id: field.id.clone(),
                    depends_on: depends_on.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_group_with_dynamic_select() {
        let json = r#"{
            "formId": "f",
            "title": "F",
            "fields": [{
                "id": "address", "label": "Address", "type": "group",
                "fields": [
                    {"id": "country", "label": "Country", "type": "select", "options": ["USA"]},
                    {"id": "state", "label": "State", "type": "select", "required": true,
                     "dynamicOptions": {"dependsOn": "country", "endpoint": "/api/getStates", "method": "GET"}}
                ]
            }]
        }"#;
        let form = FormSpec::from_json(json).unwrap();
        let state = form.field("state").unwrap();
        assert!(state.required);
        assert_eq!(state.dynamic_options().unwrap().depends_on, "country");
        assert_eq!(form.leaves().len(), 2);
        assert_eq!(form.dependents_of("country")[0].id, "state");
    }

    #[test]
    fn rejects_children_on_leaf() {
        let json = r#"{"formId": "f", "title": "F", "fields": [
            {"id": "a", "label": "A", "type": "text", "fields": []}
        ]}"#;
        assert!(matches!(
            FormSpec::from_json(json),
            Err(SchemaError::ChildrenOnLeaf { .. })
        ));
    }

    #[test]
    fn rejects_dynamic_options_on_radio() {
        let json = r#"{"formId": "f", "title": "F", "fields": [
            {"id": "c", "label": "C", "type": "text"},
            {"id": "a", "label": "A", "type": "radio",
             "dynamicOptions": {"dependsOn": "c", "endpoint": "/x"}}
        ]}"#;
        assert!(matches!(
            FormSpec::from_json(json),
            Err(SchemaError::DynamicOptionsOnNonSelect { .. })
        ));
    }

    #[test]
    fn rejects_duplicates_and_unknown_dependencies() {
        let dup = r#"{"formId": "f", "title": "F", "fields": [
            {"id": "a", "label": "A", "type": "text"},
            {"id": "g", "label": "G", "type": "group", "fields": [
                {"id": "a", "label": "A", "type": "text"}
            ]}
        ]}"#;
        assert!(matches!(
            FormSpec::from_json(dup),
            Err(SchemaError::DuplicateFieldId { .. })
        ));

        let unknown = r#"{"formId": "f", "title": "F", "fields": [
            {"id": "a", "label": "A", "type": "text",
             "visibility": {"dependsOn": "ghost", "condition": "equals", "value": "x"}}
        ]}"#;
        assert!(matches!(
            FormSpec::from_json(unknown),
            Err(SchemaError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn rejects_bad_pattern() {
        let json = r#"{"formId": "f", "title": "F", "fields": [
            {"id": "a", "label": "A", "type": "text", "validation": {"pattern": "("}}
        ]}"#;
        assert!(matches!(
            FormSpec::from_json(json),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }
}

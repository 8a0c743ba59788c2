use crate::options::OptionResolver;
use crate::schema::{FieldKind, FieldSpec};
use crate::value::{FieldValue, FormErrors, FormValues};
use crate::visibility::is_visible;

mod formatter;

pub use formatter::TreeFormatter;

/// One node of the rendered form: a titled group or an input field.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Group {
        id: String,
        label: String,
        children: Vec<RenderNode>,
    },
    Field(RenderedField),
}

/// Everything a presentation layer needs to draw one input.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub id: String,
    pub label: String,
    pub kind: &'static str,
    pub required: bool,
    pub value: Option<FieldValue>,
    pub error: Option<String>,
    /// Choices offered right now. Empty for free-form kinds and for loading selects.
    pub options: Vec<String>,
    /// Dynamic options are being fetched; the field must not accept a selection.
    pub loading: bool,
    pub placeholder: Option<String>,
}

impl RenderNode {
    pub fn id(&self) -> &str {
        match self {
            RenderNode::Group { id, .. } => id,
            RenderNode::Field(field) => &field.id,
        }
    }

    /// Ids of every rendered input below (and including) this node, in order.
    pub fn field_ids(&self) -> Vec<&str> {
        match self {
            RenderNode::Group { children, .. } => {
                children.iter().flat_map(RenderNode::field_ids).collect()
            }
            RenderNode::Field(field) => vec![field.id.as_str()],
        }
    }
}

/// Walks the schema forest and renders it for the current state.
///
/// Groups are always rendered (with whatever children are visible); leaves
/// whose visibility rule fails are left out entirely.
pub fn render_tree(
    fields: &[FieldSpec],
    values: &FormValues,
    errors: &FormErrors,
    options: &OptionResolver,
) -> Vec<RenderNode> {
    fields
        .iter()
        .filter_map(|field| render_node(field, values, errors, options))
        .collect()
}

fn render_node(
    field: &FieldSpec,
    values: &FormValues,
    errors: &FormErrors,
    options: &OptionResolver,
) -> Option<RenderNode> {
    if let FieldKind::Group { children } = &field.kind {
        return Some(RenderNode::Group {
            id: field.id.clone(),
            label: field.label.clone(),
            children: render_tree(children, values, errors, options),
        });
    }

    if !is_visible(field, values) {
        return None;
    }

    let loading = options.is_loading(&field.id);
    let label_lower = field.label.to_lowercase();
    let placeholder = match field.kind {
        FieldKind::Text | FieldKind::Number => Some(format!("Enter {}", label_lower)),
        FieldKind::Select { .. } if loading => Some("Loading...".to_string()),
        FieldKind::Select { .. } => Some(format!("Select {}", label_lower)),
        _ => None,
    };

    Some(RenderNode::Field(RenderedField {
        id: field.id.clone(),
        label: field.label.clone(),
        kind: field.kind.name(),
        required: field.required,
        value: values.get(&field.id).cloned(),
        error: errors.get(&field.id).cloned(),
        options: options.options_for(field).to_vec(),
        loading,
        placeholder,
    }))
}

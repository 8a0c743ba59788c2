use regex::Regex;
use std::fmt;

/// A complete form: an ordered forest of fields under a unique id.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    pub form_id: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

/// A single schema-described input, or a group nesting other fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
    pub validation: Option<ValidationRules>,
    pub visibility: Option<VisibilityRule>,
}

/// The kind of a field. Children and dynamic options only exist where they are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Select {
        options: Vec<String>,
        dynamic: Option<DynamicOptions>,
    },
    Radio {
        options: Vec<String>,
    },
    Checkbox {
        options: Vec<String>,
    },
    Group {
        children: Vec<FieldSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Pattern>,
}

/// A compiled regular expression that remembers the source it was built from.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Equals,
    NotEquals,
}

/// Shows a field only while another field's value does (or does not) equal `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityRule {
    pub depends_on: String,
    pub condition: Condition,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchDescriptor {
    pub endpoint: String,
    pub method: String,
}

/// Options of a select that are fetched at runtime from another field's value.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicOptions {
    pub depends_on: String,
    pub fetch: FetchDescriptor,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Select { .. } => "select",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Checkbox { .. } => "checkbox",
            FieldKind::Group { .. } => "group",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FieldSpec {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, FieldKind::Group { .. })
    }

    pub fn children(&self) -> &[FieldSpec] {
        match &self.kind {
            FieldKind::Group { children } => children,
            _ => &[],
        }
    }

    /// Static options declared in the schema. Empty for kinds without options.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            FieldKind::Select { options, .. }
            | FieldKind::Radio { options }
            | FieldKind::Checkbox { options } => options,
            _ => &[],
        }
    }

    pub fn dynamic_options(&self) -> Option<&DynamicOptions> {
        match &self.kind {
            FieldKind::Select { dynamic, .. } => dynamic.as_ref(),
            _ => None,
        }
    }

    /// Visits this field and all of its descendants, depth first.
    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FieldSpec>) {
        match &self.kind {
            FieldKind::Group { children } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            _ => out.push(self),
        }
    }

    fn find<'a>(&'a self, id: &str) -> Option<&'a FieldSpec> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

impl FormSpec {
    /// All input fields of the form in document order, ignoring group nesting.
    pub fn leaves(&self) -> Vec<&FieldSpec> {
        let mut out = Vec::new();
        for field in &self.fields {
            field.collect_leaves(&mut out);
        }
        out
    }

    /// Looks a field up anywhere in the tree, groups included.
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find_map(|f| f.find(id))
    }

    /// Selects whose dynamic options are driven by the field `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<&FieldSpec> {
        self.leaves()
            .into_iter()
            .filter(|f| f.dynamic_options().is_some_and(|d| d.depends_on == id))
            .collect()
    }

    /// Number of top-level sections, as the form picker shows it.
    pub fn section_count(&self) -> usize {
        self.fields.len()
    }
}

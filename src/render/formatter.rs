use super::{RenderNode, RenderedField};

/// Formats a rendered form as an indented text tree.
pub struct TreeFormatter;

impl TreeFormatter {
    /// Format a list of top-level nodes, one line per node.
    pub fn format(nodes: &[RenderNode]) -> String {
        let mut out = String::new();
        for (i, node) in nodes.iter().enumerate() {
            Self::format_recursive(node, "", i + 1 == nodes.len(), &mut out);
        }
        out
    }

    fn format_recursive(node: &RenderNode, prefix: &str, is_last: bool, out: &mut String) {
        let marker = if is_last { "└── " } else { "├── " };
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match node {
            RenderNode::Group {
                label, children, ..
            } => {
                out.push_str(&format!("{}{}[{}]\n", prefix, marker, label));
                for (i, child) in children.iter().enumerate() {
                    Self::format_recursive(child, &child_prefix, i + 1 == children.len(), out);
                }
            }
            RenderNode::Field(field) => {
                out.push_str(&format!("{}{}{}\n", prefix, marker, Self::format_field(field)));
                if let Some(error) = &field.error {
                    out.push_str(&format!("{}  ! {}\n", child_prefix, error));
                }
            }
        }
    }

    fn format_field(field: &RenderedField) -> String {
        let required = if field.required { "*" } else { "" };
        let value = match (&field.value, field.loading) {
            (_, true) => "(loading...)".to_string(),
            (Some(value), _) if !value.is_empty() => value.to_string(),
            _ => field
                .placeholder
                .as_ref()
                .map(|p| format!("<{}>", p))
                .unwrap_or_else(|| "<empty>".to_string()),
        };
        let mut line = format!("{}{} ({}) = {}", field.label, required, field.kind, value);
        if !field.options.is_empty() && !field.loading {
            line.push_str(&format!(" {{{}}}", field.options.join(" | ")));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, value: Option<&str>, error: Option<&str>) -> RenderNode {
        RenderNode::Field(RenderedField {
            id: id.to_string(),
            label: id.to_uppercase(),
            kind: "text",
            required: true,
            value: value.map(Into::into),
            error: error.map(str::to_string),
            options: vec![],
            loading: false,
            placeholder: Some(format!("Enter {}", id)),
        })
    }

    #[test]
    fn formats_groups_and_errors() {
        let nodes = vec![RenderNode::Group {
            id: "g".to_string(),
            label: "Group".to_string(),
            children: vec![
                leaf("a", Some("x"), None),
                leaf("b", None, Some("B is required")),
            ],
        }];
        let text = TreeFormatter::format(&nodes);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "└── [Group]");
        assert_eq!(lines[1], "    ├── A* (text) = x");
        assert_eq!(lines[2], "    └── B* (text) = <Enter b>");
        assert_eq!(lines[3], "          ! B is required");
    }
}

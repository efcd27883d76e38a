//! Compact structural notation for an optimized document

use super::format::{abbreviate_type, ValueFormatter};
use super::node::{Document, Node};

const INDENT: &str = "  ";

/// Serialize every root, separating roots with a blank line
pub fn write_document(doc: &Document) -> String {
    if doc.roots.is_empty() {
        return String::new();
    }

    let mut formatter = ValueFormatter::new(doc);
    let rendered: Vec<String> = doc
        .roots
        .iter()
        .map(|root| render_node(root, &mut formatter, 0))
        .collect();

    let mut output = rendered.join("\n\n");
    output.push('\n');
    output
}

/// `Name (Type) {key:value, $Sig:..., children: [...]}`
fn render_node(node: &Node, formatter: &mut ValueFormatter<'_>, depth: usize) -> String {
    let mut out = String::new();

    if node.is_synthetic_root() {
        out.push_str("ROOT");
    } else {
        out.push_str(&node.name);
    }
    if let Some(type_name) = &node.type_name {
        out.push_str(" (");
        out.push_str(abbreviate_type(type_name));
        out.push(')');
    }

    let mut parts = formatter.format_pairs(&node.properties);
    parts.extend(node.signals.iter().map(|signal| format!("$Sig:{}", signal)));

    if !node.children.is_empty() {
        let child_indent = INDENT.repeat(depth + 1);
        let children: Vec<String> = node
            .children
            .iter()
            .map(|child| format!("{}{}", child_indent, render_node(child, formatter, depth + 1)))
            .collect();
        parts.push(format!(
            "children: [\n{}\n{}]",
            children.join(",\n"),
            INDENT.repeat(depth)
        ));
    }

    out.push_str(" {");
    out.push_str(&parts.join(", "));
    out.push('}');
    out
}

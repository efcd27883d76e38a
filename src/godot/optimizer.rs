//! Folding of repeated sibling subtrees

use indexmap::IndexMap;
use tracing::trace;

use super::node::{Node, NodeKind};

/// Keys that vary per instance and are ignored when comparing siblings
const POSITIONAL_KEYS: &[&str] = &["transform", "position", "rotation", "rotation_degrees"];

/// Shortest run of similar siblings that gets folded
pub const MIN_FOLD_RUN: usize = 3;

/// Fold repeated siblings at every level, deepest levels first
pub fn optimize(nodes: Vec<Node>) -> Vec<Node> {
    let nodes: Vec<Node> = nodes
        .into_iter()
        .map(|mut node| {
            node.children = optimize(std::mem::take(&mut node.children));
            node
        })
        .collect();

    fold_runs(nodes)
}

/// Collapse maximal runs of similar adjacent nodes on one level
fn fold_runs(nodes: Vec<Node>) -> Vec<Node> {
    let mut folded = Vec::with_capacity(nodes.len());
    let mut run: Vec<Node> = Vec::new();

    for node in nodes {
        let extends_run = run.first().map_or(true, |first| is_similar(first, &node));
        if !extends_run {
            flush_run(&mut folded, std::mem::take(&mut run));
        }
        run.push(node);
    }
    flush_run(&mut folded, run);

    folded
}

fn flush_run(out: &mut Vec<Node>, run: Vec<Node>) {
    if run.len() < MIN_FOLD_RUN {
        out.extend(run);
        return;
    }

    let count = run.len();
    if let Some(first) = run.into_iter().next() {
        trace!(count, name = %first.name, "folding sibling run");
        out.push(fold(first, count));
    }
}

/// Build the group node that stands for `count` copies of `first`
fn fold(first: Node, count: usize) -> Node {
    let label = first.type_name.clone().unwrap_or_else(|| "Node".to_string());

    let mut properties = IndexMap::with_capacity(first.properties.len() + 1);
    properties.insert("Layout".to_string(), format!("\"folded {} siblings\"", count));
    properties.extend(
        first
            .properties
            .into_iter()
            .filter(|(key, _)| !is_positional(key)),
    );

    Node {
        name: format!("x{}_{}", count, label),
        kind: NodeKind::FoldedGroup { count },
        type_name: first.type_name,
        properties,
        children: first.children,
        signals: first.signals,
    }
}

fn is_positional(key: &str) -> bool {
    POSITIONAL_KEYS.contains(&key)
}

/// Shallow structural comparison of two siblings
///
/// Children are only compared by type: they have already been folded,
/// so their top-level shape stands in for the whole subtree.
pub fn is_similar(a: &Node, b: &Node) -> bool {
    if a.type_name != b.type_name || a.children.len() != b.children.len() {
        return false;
    }

    let same_properties = a
        .properties
        .keys()
        .chain(b.properties.keys())
        .filter(|key| !is_positional(key))
        .all(|key| a.properties.get(key) == b.properties.get(key));
    if !same_properties {
        return false;
    }

    a.children
        .iter()
        .zip(&b.children)
        .all(|(x, y)| x.type_name == y.type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, type_name: &str, props: &[(&str, &str)]) -> Node {
        let mut node = Node::new(name, NodeKind::Scene, Some(type_name.to_string()));
        for (key, value) in props {
            node.properties.insert(key.to_string(), value.to_string());
        }
        node
    }

    fn tile(i: usize) -> Node {
        let mut tile = node(
            &format!("Tile{}", i),
            "MeshInstance3D",
            &[
                ("transform", &format!("Transform3D(1,0,0,0,1,0,0,0,1,{},0,0)", i)),
                ("mesh", "SubResource(\"1\")"),
            ],
        );
        tile.children.push(node("Shape", "CollisionShape3D", &[]));
        tile
    }

    #[test]
    fn test_run_of_five_folds_into_one_group() {
        let folded = optimize((0..5).map(tile).collect());
        assert_eq!(folded.len(), 1);

        let group = &folded[0];
        assert_eq!(group.kind, NodeKind::FoldedGroup { count: 5 });
        assert_eq!(group.name, "x5_MeshInstance3D");
        assert_eq!(group.type_name.as_deref(), Some("MeshInstance3D"));
        assert!(!group.properties.contains_key("transform"));
        assert_eq!(group.properties.get_index(0).map(|(k, _)| k.as_str()), Some("Layout"));
        assert_eq!(group.properties["mesh"], "SubResource(\"1\")");
        assert_eq!(group.children.len(), 1);
    }

    #[test]
    fn test_pair_is_not_folded() {
        let folded = optimize((0..2).map(tile).collect());
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].name, "Tile0");
        assert_eq!(folded[1].name, "Tile1");
    }

    #[test]
    fn test_runs_keep_order_around_other_nodes() {
        let mut nodes = vec![node("Light", "OmniLight3D", &[])];
        nodes.extend((0..3).map(tile));
        nodes.push(node("Cam", "Camera3D", &[]));

        let folded = optimize(nodes);
        let names: Vec<&str> = folded.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Light", "x3_MeshInstance3D", "Cam"]);
    }

    #[test]
    fn test_differing_property_breaks_run() {
        let mut nodes: Vec<Node> = (0..4).map(tile).collect();
        nodes[2].properties.insert("visible".to_string(), "false".to_string());

        let folded = optimize(nodes);
        assert_eq!(folded.len(), 4);
    }

    #[test]
    fn test_nested_runs_fold_bottom_up() {
        let rows: Vec<Node> = (0..3)
            .map(|r| {
                let mut row = node(&format!("Row{}", r), "Node3D", &[]);
                row.children = (0..4).map(tile).collect();
                row
            })
            .collect();

        let folded = optimize(rows);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].kind, NodeKind::FoldedGroup { count: 3 });
        assert_eq!(folded[0].children.len(), 1);
        assert_eq!(folded[0].children[0].kind, NodeKind::FoldedGroup { count: 4 });
    }

    #[test]
    fn test_similarity_checks_child_types() {
        let a = tile(0);
        let mut b = tile(1);
        b.children[0].type_name = Some("Area3D".to_string());
        assert!(!is_similar(&a, &b));

        let mut c = tile(2);
        c.children[0].name = "Renamed".to_string();
        assert!(is_similar(&a, &c));
    }
}

//! Two-pass construction of a [`Document`] from tokens

use std::collections::HashMap;

use tracing::{debug, trace};

use super::format::abbreviate_type;
use super::lexer::{Header, Token};
use super::node::{Document, Node, NodeKind};

/// Property keys that carry no structural information
const IGNORED_KEYS: &[&str] = &[
    "uid",
    "load_steps",
    "format",
    "q_index",
    "node_paths",
    "skeleton",
];

const SCRIPT_EXTENSIONS: &[&str] = &[".gd", ".cs"];
const SCENE_EXTENSIONS: &[&str] = &[".tscn", ".scn"];

/// Parse a token stream into a document
pub fn parse(tokens: &[Token], file_name: &str) -> Document {
    let hint = file_stem(file_name);
    let aliases = collect_aliases(tokens, &hint);
    let (roots, sub_resources) = build_tree(tokens, &aliases, &hint);

    Document {
        roots,
        aliases,
        sub_resources,
    }
}

/// Pass 1: map every external resource id to its alias
pub fn collect_aliases(tokens: &[Token], hint: &str) -> HashMap<String, String> {
    let mut aliases = HashMap::new();

    for token in tokens {
        let Token::Header(header) = token else {
            continue;
        };
        if header.keyword != "ext_resource" {
            continue;
        }
        let Some(id) = header.attr("id") else {
            continue;
        };

        let alias = derive_alias(id, header.attr("path"), header.attr("type"), hint);
        trace!(id, alias = %alias, "external resource");
        aliases.insert(id.to_string(), alias);
    }

    aliases
}

/// Alias for one external resource declaration
pub fn derive_alias(id: &str, path: Option<&str>, type_name: Option<&str>, hint: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) if SCRIPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) => {
            format!("$Scr_{}", file_stem(path))
        }
        Some(path) if SCENE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) => {
            format!("$Scn_{}", file_stem(path))
        }
        Some(path) => format!("$Res_{}", file_stem(path)),
        None => {
            let label = type_name.filter(|t| !t.is_empty()).unwrap_or(hint);
            format!("$Ext_{}_{}", abbreviate_type(label), id)
        }
    }
}

/// Pass 2: build the scene tree, resource root and sub-resource cache
pub fn build_tree(
    tokens: &[Token],
    aliases: &HashMap<String, String>,
    hint: &str,
) -> (Vec<Node>, HashMap<String, Node>) {
    let mut builder = TreeBuilder::new(aliases, hint);

    for token in tokens {
        match token {
            Token::Header(header) => builder.open_section(header),
            Token::Property { key, value } => builder.add_property(key, value),
        }
    }

    builder.finish()
}

/// Arena slot; `node` is taken out once when the tree is assembled
struct Slot {
    node: Option<Node>,
    children: Vec<usize>,
}

struct TreeBuilder<'a> {
    aliases: &'a HashMap<String, String>,
    hint: &'a str,
    arena: Vec<Slot>,
    roots: Vec<usize>,
    paths: HashMap<String, usize>,
    sub_resources: HashMap<String, usize>,
    resource_type: Option<String>,
    current: Option<usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(aliases: &'a HashMap<String, String>, hint: &'a str) -> Self {
        Self {
            aliases,
            hint,
            arena: Vec::new(),
            roots: Vec::new(),
            paths: HashMap::new(),
            sub_resources: HashMap::new(),
            resource_type: None,
            current: None,
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        self.arena.push(Slot {
            node: Some(node),
            children: Vec::new(),
        });
        self.arena.len() - 1
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.arena.get_mut(idx).and_then(|slot| slot.node.as_mut())
    }

    fn open_section(&mut self, header: &Header) {
        self.current = None;

        match header.keyword.as_str() {
            "gd_resource" => {
                self.resource_type = header.attr("type").map(str::to_string);
            }
            "sub_resource" => {
                let id = header.attr("id").unwrap_or_default();
                let node = Node::new(
                    format!("SubResource_{}", id),
                    NodeKind::SubResource,
                    header.attr("type").map(str::to_string),
                );
                let idx = self.alloc(node);
                if !id.is_empty() {
                    self.sub_resources.insert(id.to_string(), idx);
                }
                self.current = Some(idx);
            }
            "resource" => {
                let type_name = self
                    .resource_type
                    .clone()
                    .unwrap_or_else(|| self.hint.to_string());
                let idx = self.alloc(Node::new("RootResource", NodeKind::ResourceRoot, Some(type_name)));
                self.roots.push(idx);
                self.current = Some(idx);
            }
            "node" => {
                let idx = self.open_node(header);
                self.current = Some(idx);
            }
            "connection" => self.connect(header),
            _ => {}
        }
    }

    fn open_node(&mut self, header: &Header) -> usize {
        let name = header.attr("name").unwrap_or_default().to_string();
        let type_name = header
            .attr("type")
            .map(str::to_string)
            .or_else(|| self.instance_alias(header));
        let kind = if header.attr("parent").is_none() {
            NodeKind::SceneRoot
        } else {
            NodeKind::Scene
        };
        let idx = self.alloc(Node::new(name.clone(), kind, type_name));

        match header.attr("parent").filter(|parent| *parent != ".") {
            None => {
                self.roots.push(idx);
                self.paths.insert(name, idx);
            }
            Some(parent) => {
                let path = format!("{}/{}", parent, name);
                match self.paths.get(parent).copied() {
                    Some(parent_idx) => self.arena[parent_idx].children.push(idx),
                    None => {
                        debug!(parent, path = %path, "parent not found, promoting node to root");
                        self.roots.push(idx);
                    }
                }
                self.paths.insert(path, idx);
            }
        }

        idx
    }

    /// Alias of the scene instanced by a typeless node
    fn instance_alias(&self, header: &Header) -> Option<String> {
        let instance = header.attr("instance")?;
        let id = reference_id(instance, "ExtResource")?;
        self.aliases.get(id).cloned()
    }

    fn connect(&mut self, header: &Header) {
        let signal = header.attr("signal").unwrap_or_default();
        let from = header.attr("from").unwrap_or_default();
        let to = header.attr("to").unwrap_or_default();
        let method = header.attr("method").unwrap_or_default();

        let source = self.paths.get(from).copied().or_else(|| {
            if from == "." {
                self.roots.first().copied()
            } else {
                None
            }
        });

        let descriptor = format!("{}->{}.{}", signal, to, method);
        match source.and_then(|idx| self.node_mut(idx)) {
            Some(node) => node.signals.push(descriptor),
            None => debug!(from, signal, "dropping connection with unresolved source"),
        }
    }

    fn add_property(&mut self, key: &str, value: &str) {
        if is_ignored_key(key) {
            return;
        }
        if let Some(node) = self.current.and_then(|idx| self.node_mut(idx)) {
            node.properties.insert(key.to_string(), value.to_string());
        }
    }

    fn finish(mut self) -> (Vec<Node>, HashMap<String, Node>) {
        let roots = std::mem::take(&mut self.roots);
        let roots = roots.into_iter().filter_map(|idx| self.take(idx)).collect();

        let sub_ids = std::mem::take(&mut self.sub_resources);
        let sub_resources = sub_ids
            .into_iter()
            .filter_map(|(id, idx)| self.take(idx).map(|node| (id, node)))
            .collect();

        (roots, sub_resources)
    }

    /// Move a node and its subtree out of the arena
    fn take(&mut self, idx: usize) -> Option<Node> {
        let slot = self.arena.get_mut(idx)?;
        let mut node = slot.node.take()?;
        let child_ids = std::mem::take(&mut slot.children);
        node.children = child_ids.into_iter().filter_map(|c| self.take(c)).collect();
        Some(node)
    }
}

fn is_ignored_key(key: &str) -> bool {
    IGNORED_KEYS.contains(&key) || key.starts_with("metadata/")
}

/// Extract the id from `Keyword(id)` or `Keyword("id")`
pub fn reference_id<'v>(value: &'v str, keyword: &str) -> Option<&'v str> {
    let start = value.find(keyword)? + keyword.len();
    let rest = value[start..].strip_prefix('(')?;
    let end = rest.find(')')?;
    let id = rest[..end].trim().trim_matches('"');
    Some(id)
}

/// File name without directories or final extension
pub fn file_stem(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::godot::lexer::tokenize;

    fn parse_str(content: &str) -> Document {
        parse(&tokenize(content), "level.tscn")
    }

    #[test]
    fn test_alias_derivation() {
        assert_eq!(derive_alias("1", Some("res://player.gd"), Some("Script"), "x"), "$Scr_player");
        assert_eq!(derive_alias("2", Some("res://enemy.tscn"), Some("PackedScene"), "x"), "$Scn_enemy");
        assert_eq!(derive_alias("3", Some("res://art/icon.png"), Some("Texture2D"), "x"), "$Res_icon");
        assert_eq!(derive_alias("4", None, Some("MeshInstance3D"), "x"), "$Ext_Mesh_4");
        assert_eq!(derive_alias("5", Some(""), None, "level"), "$Ext_level_5");
    }

    #[test]
    fn test_forward_reference_to_external_resource() {
        let doc = parse_str(
            "[node name=\"Root\" type=\"Sprite2D\"]\ntexture = ExtResource(\"9\")\n\n[ext_resource type=\"Texture2D\" path=\"res://late.png\" id=\"9\"]\n",
        );
        assert_eq!(doc.aliases.get("9").map(String::as_str), Some("$Res_late"));
    }

    #[test]
    fn test_dot_parent_nodes_are_sibling_roots() {
        let doc = parse_str(
            "[node name=\"Main\" type=\"Node3D\"]\n\n[node name=\"A\" type=\"Node\" parent=\".\"]\n\n[node name=\"B\" type=\"Node\" parent=\"A\"]\n",
        );
        let names: Vec<&str> = doc.roots.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Main", "A"]);
        assert!(doc.roots[0].children.is_empty());
        assert_eq!(doc.roots[1].children[0].name, "B");
    }

    #[test]
    fn test_only_parentless_node_is_scene_root() {
        let doc = parse_str(
            "[node type=\"Node3D\"]\n\n[node type=\"Node\" parent=\".\"]\n\n[node name=\"Lost\" parent=\"Gone\"]\n",
        );
        let kinds: Vec<&NodeKind> = doc.roots.iter().map(|n| &n.kind).collect();
        assert_eq!(kinds, vec![&NodeKind::SceneRoot, &NodeKind::Scene, &NodeKind::Scene]);
        assert!(doc.roots[0].is_synthetic_root());
        assert!(!doc.roots[1].is_synthetic_root());
    }

    #[test]
    fn test_nested_paths_resolve_under_dot_children() {
        let doc = parse_str(
            "[node name=\"Root\" type=\"Node3D\" parent=\".\"]\n\n[node name=\"Body\" type=\"StaticBody3D\" parent=\"Root\"]\n\n[node name=\"Shape\" type=\"CollisionShape3D\" parent=\"Root/Body\"]\n",
        );
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.roots[0].children[0].name, "Body");
        assert_eq!(doc.roots[0].children[0].children[0].name, "Shape");
    }

    #[test]
    fn test_unknown_parent_promotes_to_root() {
        let doc = parse_str(
            "[node name=\"Main\" type=\"Node\"]\n\n[node name=\"Lost\" type=\"Node\" parent=\"Missing/Path\"]\n",
        );
        assert_eq!(doc.roots.len(), 2);
        assert_eq!(doc.roots[1].name, "Lost");
    }

    #[test]
    fn test_ignored_keys_and_order() {
        let doc = parse_str(
            "[node name=\"Main\" type=\"Node\"]\nvisible = false\nuid = \"x\"\nmetadata/_edit_lock_ = true\nskeleton = NodePath(\"..\")\nz_index = 2\n",
        );
        let keys: Vec<&str> = doc.roots[0].properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["visible", "z_index"]);
    }

    #[test]
    fn test_connections_attach_to_source() {
        let doc = parse_str(
            "[node name=\"Main\" type=\"Node\"]\n\n[node name=\"Button\" type=\"Button\" parent=\".\"]\n\n[connection signal=\"pressed\" from=\"Button\" to=\".\" method=\"_on_pressed\"]\n[connection signal=\"ready\" from=\".\" to=\".\" method=\"_on_ready\"]\n[connection signal=\"gone\" from=\"Nowhere\" to=\".\" method=\"_x\"]\n",
        );
        // `.` falls back to the first root
        assert_eq!(doc.roots[0].signals, vec!["ready->.._on_ready".to_string()]);
        assert_eq!(doc.roots[1].name, "Button");
        assert_eq!(doc.roots[1].signals, vec!["pressed->.._on_pressed".to_string()]);
    }

    #[test]
    fn test_sub_resources_are_cached_not_parented() {
        let doc = parse_str(
            "[sub_resource type=\"BoxShape3D\" id=\"BoxShape3D_1\"]\nsize = Vector3(1, 2, 3)\n\n[node name=\"Main\" type=\"Node3D\"]\n",
        );
        assert_eq!(doc.roots.len(), 1);
        assert!(doc.roots[0].children.is_empty());
        let shape = &doc.sub_resources["BoxShape3D_1"];
        assert_eq!(shape.kind, NodeKind::SubResource);
        assert_eq!(shape.properties["size"], "Vector3(1, 2, 3)");
    }

    #[test]
    fn test_resource_root_uses_declared_type() {
        let doc = parse(
            &tokenize("[gd_resource type=\"StandardMaterial3D\" format=3]\n\n[resource]\nmetallic = 0.5\n"),
            "metal.tres",
        );
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.roots[0].kind, NodeKind::ResourceRoot);
        assert_eq!(doc.roots[0].type_name.as_deref(), Some("StandardMaterial3D"));
    }

    #[test]
    fn test_instance_takes_alias_as_type() {
        let doc = parse_str(
            "[ext_resource type=\"PackedScene\" path=\"res://enemy.tscn\" id=\"2\"]\n\n[node name=\"Main\" type=\"Node\"]\n\n[node name=\"Enemy\" parent=\".\" instance=ExtResource(\"2\")]\n",
        );
        assert_eq!(doc.roots[1].type_name.as_deref(), Some("$Scn_enemy"));
    }

    #[test]
    fn test_properties_under_ext_resource_are_dropped() {
        let doc = parse_str(
            "[ext_resource type=\"Script\" path=\"res://a.gd\" id=\"1\"]\nstray = 1\n\n[editable path=\"x\"]\nother = 2\n",
        );
        assert!(doc.roots.is_empty());
    }

    #[test]
    fn test_reference_id() {
        assert_eq!(reference_id("SubResource(\"abc_1\")", "SubResource"), Some("abc_1"));
        assert_eq!(reference_id("ExtResource( 3 )", "ExtResource"), Some("3"));
        assert_eq!(reference_id("ExtResource", "ExtResource"), None);
    }
}

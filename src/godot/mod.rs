/*!
 * Semantic compaction of Godot `.tscn` / `.tres` text files
 *
 * The document is tokenized, rebuilt as a node tree plus resource tables,
 * repeated siblings are folded, and the result is written in a terse
 * nested notation. Malformed input never fails: unresolved references
 * pass through as written and orphaned nodes become extra roots.
 */

pub mod format;
pub mod lexer;
pub mod node;
pub mod optimizer;
pub mod parser;
pub mod writer;

pub use node::{Document, Node, NodeKind};

use tracing::debug;

/// File extensions handled by [`compact`]
pub const GODOT_TEXT_EXTENSIONS: &[&str] = &["tscn", "tres"];

/// Compact one scene or resource file
pub fn compact(content: &str, file_name: &str) -> String {
    let tokens = lexer::tokenize(content);
    let mut doc = parser::parse(&tokens, file_name);

    let before = doc.roots.len();
    doc.roots = optimizer::optimize(std::mem::take(&mut doc.roots));
    debug!(
        file = file_name,
        tokens = tokens.len(),
        roots = before,
        sub_resources = doc.sub_resources.len(),
        "compacted godot document"
    );

    writer::write_document(&doc)
}

/// Whether a file name has a Godot text scene/resource extension
pub fn is_godot_text_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    GODOT_TEXT_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"[gd_scene load_steps=2 format=3 uid="uid://abc"]

[ext_resource type="Texture2D" path="res://icon.png" id="1"]

[node name="Root" type="Node3D" parent="."]
visible = true

[node name="Child" type="Sprite2D" parent="Root"]
texture = ExtResource("1")
"#;

    #[test]
    fn test_scenario_alias_and_children() {
        let output = compact(SCENARIO, "main.tscn");
        assert!(output.contains("$Res_icon"));
        assert!(!output.contains("ExtResource"));
        assert!(output.contains("children: ["));
        assert!(output.contains("Child (Spr) {texture:$Res_icon}"));
        assert_eq!(
            output,
            "Root (N3D) {visible:true, children: [\n  Child (Spr) {texture:$Res_icon}\n]}\n"
        );
    }

    #[test]
    fn test_dot_parent_nodes_render_as_separate_roots() {
        let content = "[node name=\"Main\" type=\"Node3D\"]\n\n[node name=\"A\" type=\"Node\" parent=\".\"]\n\n[node name=\"B\" type=\"Node\" parent=\"A\"]\n";
        assert_eq!(
            compact(content, "main.tscn"),
            "Main (N3D) {}\n\nA (Node) {children: [\n  B (Node) {}\n]}\n"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let content = level_scene(6);
        assert_eq!(compact(&content, "level.tscn"), compact(&content, "level.tscn"));
    }

    #[test]
    fn test_alias_is_identical_at_every_site() {
        let content = r#"[ext_resource type="Script" path="res://mover.gd" id="7_x"]

[node name="Main" type="Node"]
script = ExtResource("7_x")

[node name="A" type="Node" parent="."]
script = ExtResource("7_x")
extra = [ExtResource("7_x"), 2]
"#;
        let output = compact(content, "main.tscn");
        assert_eq!(output.matches("$Scr_mover").count(), 3);
        assert!(!output.contains("ExtResource"));
    }

    #[test]
    fn test_orphan_sub_resource_is_not_emitted() {
        let content = r#"[sub_resource type="BoxShape3D" id="used"]
size = Vector3(2, 2, 2)

[sub_resource type="SphereShape3D" id="unused"]
radius = 9.75

[node name="Main" type="CollisionShape3D"]
shape = SubResource("used")
"#;
        let output = compact(content, "main.tscn");
        assert!(output.contains("shape:Box{size:[2,2,2]}"));
        assert!(!output.contains("9.75"));
        assert!(!output.contains("Sphere"));
    }

    #[test]
    fn test_repeated_tiles_fold() {
        let output = compact(&level_scene(6), "level.tscn");
        assert!(output.contains("x6_MeshInstance3D (Mesh) {Layout:\"folded 6 siblings\""));
        assert!(!output.contains("Tile_3"));
        assert!(!output.contains("xt:"));
    }

    #[test]
    fn test_resource_file() {
        let content = r#"[gd_resource type="StandardMaterial3D" load_steps=2 format=3]

[ext_resource type="Texture2D" path="res://tex/brick.png" id="1_t"]

[resource]
albedo_color = Color(0.8, 0.25, 0.1, 1)
albedo_texture = ExtResource("1_t")
metadata/_custom = 3
"#;
        let output = compact(content, "brick.tres");
        assert_eq!(
            output,
            "ROOT (StdMat) {albedo_color:[0.8,0.25,0.1,1], albedo_texture:$Res_brick}\n"
        );
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let output = compact("[[[\n= = =\n]\nfoo\n[node parent=\"x/y\"]\nk = (((\n", "junk.tscn");
        // A nameless node with a parent is not the scene root
        assert!(!output.is_empty());
        assert!(!output.contains("ROOT"));
    }

    #[test]
    fn test_godot_extension_check() {
        assert!(is_godot_text_file("main.tscn"));
        assert!(is_godot_text_file("Brick.TRES"));
        assert!(!is_godot_text_file("player.gd"));
    }

    fn level_scene(tiles: usize) -> String {
        let mut content = String::from(
            "[gd_scene format=3]\n\n[sub_resource type=\"BoxMesh\" id=\"m\"]\nsize = Vector3(1, 1, 1)\n\n[node name=\"Level\" type=\"Node3D\"]\n",
        );
        for i in 0..tiles {
            content.push_str(&format!(
                "\n[node name=\"Tile_{i}\" type=\"MeshInstance3D\" parent=\".\"]\ntransform = Transform3D(1, 0, 0, 0, 1, 0, 0, 0, 1, {i}, 0, 0)\nmesh = SubResource(\"m\")\n"
            ));
        }
        content
    }
}

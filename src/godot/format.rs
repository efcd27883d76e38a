//! Property value formatting and name abbreviation

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::node::{Document, Node};

static VECTOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Vector[234]i?\((.*)\)$").expect("valid vector regex"));

static COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Color\((.*)\)$").expect("valid color regex"));

static TRANSFORM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Transform3D\((.*)\)$").expect("valid transform regex"));

static EMBEDDED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(ExtResource|SubResource)\(\s*"?([^"()\s]+)"?\s*\)"#)
        .expect("valid reference regex")
});

/// Renders raw property values against one document's reference tables
pub struct ValueFormatter<'d> {
    aliases: &'d HashMap<String, String>,
    sub_resources: &'d HashMap<String, Node>,
    /// Sub-resource ids currently being inlined
    expanding: Vec<String>,
}

impl<'d> ValueFormatter<'d> {
    /// Create a formatter for a parsed document
    pub fn new(doc: &'d Document) -> Self {
        Self {
            aliases: &doc.aliases,
            sub_resources: &doc.sub_resources,
            expanding: Vec::new(),
        }
    }

    /// Render properties as `key:value` pairs in their original order
    pub fn format_pairs(&mut self, properties: &IndexMap<String, String>) -> Vec<String> {
        properties
            .iter()
            .map(|(key, value)| format!("{}:{}", shorten_key(key), self.format_value(value)))
            .collect()
    }

    /// Format one raw property value
    pub fn format_value(&mut self, raw: &str) -> String {
        let raw = raw.trim();

        if let Some(id) = whole_reference(raw, "SubResource") {
            if let Some(inlined) = self.inline_sub_resource(id) {
                return inlined;
            }
        }

        if let Some(id) = whole_reference(raw, "ExtResource") {
            if let Some(alias) = self.aliases.get(id) {
                return alias.clone();
            }
        }

        if let Some(caps) = VECTOR_PATTERN.captures(raw) {
            return component_list(&caps[1]);
        }

        if let Some(caps) = COLOR_PATTERN.captures(raw) {
            return component_list(&caps[1]);
        }

        if let Some(caps) = TRANSFORM_PATTERN.captures(raw) {
            let parts: Vec<&str> = caps[1].split(',').collect();
            if parts.len() == 12 {
                return component_list(&parts[9..].join(","));
            }
        }

        if is_string_literal(raw) {
            return raw.to_string();
        }

        if let Some(number) = clean_number(raw) {
            return number;
        }

        if raw.contains("Resource(") {
            return self.substitute_embedded(raw);
        }

        raw.to_string()
    }

    fn inline_sub_resource(&mut self, id: &str) -> Option<String> {
        let sub_resources = self.sub_resources;
        let node = sub_resources.get(id)?;
        if self.expanding.iter().any(|open| open == id) {
            return None;
        }

        self.expanding.push(id.to_string());
        let pairs = self.format_pairs(&node.properties);
        self.expanding.pop();

        let type_name = node.type_name.as_deref().map(abbreviate_type).unwrap_or_default();
        Some(format!("{}{{{}}}", type_name, pairs.join(", ")))
    }

    /// Replace references inside composite values such as arrays
    fn substitute_embedded(&mut self, raw: &str) -> String {
        let aliases = self.aliases;
        EMBEDDED_REFERENCE
            .replace_all(raw, |caps: &Captures| {
                let id = &caps[2];
                let resolved = if &caps[1] == "ExtResource" {
                    aliases.get(id).cloned()
                } else {
                    self.inline_sub_resource(id)
                };
                resolved.unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Id of a value that is exactly `Keyword(id)` or `Keyword("id")`
fn whole_reference<'v>(value: &'v str, keyword: &str) -> Option<&'v str> {
    let inner = value
        .strip_prefix(keyword)?
        .strip_prefix('(')?
        .strip_suffix(')')?
        .trim()
        .trim_matches('"');
    if inner.is_empty() || inner.contains(['(', ')', ',']) {
        return None;
    }
    Some(inner)
}

fn is_string_literal(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// Comma-separated components as a bracketed list of cleaned numbers
fn component_list(components: &str) -> String {
    let cleaned: Vec<String> = components
        .split(',')
        .map(str::trim)
        .map(|c| clean_number(c).unwrap_or_else(|| c.to_string()))
        .collect();
    format!("[{}]", cleaned.join(","))
}

/// Normalize a numeric literal, or `None` if it is not a finite number
///
/// `0` and `1` render bare, integral values drop the fractional part and
/// everything else is rounded to at most two decimals.
pub fn clean_number(raw: &str) -> Option<String> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    // Integral and very large values skip rounding
    let rounded = if value.fract() == 0.0 || value.abs() >= 1e15 {
        value
    } else {
        (value * 100.0).round() / 100.0
    };
    if rounded == 0.0 {
        return Some("0".to_string());
    }
    if value == 1.0 {
        return Some("1".to_string());
    }
    if rounded.fract() == 0.0 {
        return Some(format!("{}", rounded));
    }

    let fixed = format!("{:.2}", rounded);
    Some(fixed.trim_end_matches('0').trim_end_matches('.').to_string())
}

/// Short token for common engine types
pub fn abbreviate_type(type_name: &str) -> &str {
    match type_name {
        "MeshInstance3D" => "Mesh",
        "MeshInstance2D" => "Mesh2D",
        "CollisionShape3D" => "ColShape",
        "CollisionShape2D" => "ColShape2D",
        "CollisionPolygon3D" => "ColPoly",
        "CollisionPolygon2D" => "ColPoly2D",
        "StaticBody3D" => "Static",
        "StaticBody2D" => "Static2D",
        "RigidBody3D" => "Rigid",
        "RigidBody2D" => "Rigid2D",
        "CharacterBody3D" => "CharBody",
        "CharacterBody2D" => "CharBody2D",
        "Area3D" => "Area",
        "Node3D" => "N3D",
        "Node2D" => "N2D",
        "Sprite2D" => "Spr",
        "Sprite3D" => "Spr3D",
        "AnimatedSprite2D" => "AnimSpr",
        "AnimationPlayer" => "AnimPlayer",
        "AnimationTree" => "AnimTree",
        "DirectionalLight3D" => "DirLight",
        "OmniLight3D" => "Omni",
        "SpotLight3D" => "Spot",
        "Camera3D" => "Cam",
        "Camera2D" => "Cam2D",
        "WorldEnvironment" => "WorldEnv",
        "Environment" => "Env",
        "StandardMaterial3D" => "StdMat",
        "ShaderMaterial" => "ShaderMat",
        "ProceduralSkyMaterial" => "SkyMat",
        "BoxShape3D" => "Box",
        "SphereShape3D" => "Sphere",
        "CapsuleShape3D" => "Capsule",
        "CylinderShape3D" => "Cylinder",
        "ConvexPolygonShape3D" => "Convex",
        "ConcavePolygonShape3D" => "Concave",
        "RectangleShape2D" => "Rect",
        "CircleShape2D" => "Circle",
        "BoxMesh" => "BoxM",
        "PlaneMesh" => "PlaneM",
        "ArrayMesh" => "ArrMesh",
        "GPUParticles3D" => "Particles",
        "GPUParticles2D" => "Particles2D",
        "AudioStreamPlayer" => "Audio",
        "AudioStreamPlayer2D" => "Audio2D",
        "AudioStreamPlayer3D" => "Audio3D",
        "NavigationRegion3D" => "NavRegion",
        "TileMapLayer" => "TileLayer",
        "MarginContainer" => "Margin",
        "VBoxContainer" => "VBox",
        "HBoxContainer" => "HBox",
        "TextureRect" => "TexRect",
        "ColorRect" => "ColRect",
        "PackedScene" => "Scene",
        "Texture2D" | "CompressedTexture2D" => "Tex",
        "GDScript" => "Scr",
        other => other,
    }
}

/// Short token for frequent property keys
pub fn shorten_key(key: &str) -> &str {
    match key {
        "transform" => "xt",
        "position" => "pos",
        "rotation_degrees" => "rot",
        "material_override" => "mat",
        "collision_layer" => "layer",
        "collision_mask" => "mask",
        other => other,
    }
}

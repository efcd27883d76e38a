//! In-memory graph for one Godot text document

use std::collections::HashMap;

use indexmap::IndexMap;

/// What a [`Node`] stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A `[node]` section without a `parent` attribute
    SceneRoot,
    /// Any other `[node]` section of a scene
    Scene,
    /// A `[sub_resource]` section, reachable only through property values
    SubResource,
    /// The `[resource]` section of a `.tres` file
    ResourceRoot,
    /// A run of structurally identical siblings collapsed into one entry
    FoldedGroup {
        /// Number of siblings in the run
        count: usize,
    },
}

/// A scene node, resource or fold group
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Display identifier
    pub name: String,
    /// Kind of entity
    pub kind: NodeKind,
    /// Declared engine type, if any
    pub type_name: Option<String>,
    /// Raw property values in encounter order
    pub properties: IndexMap<String, String>,
    /// Scene-tree children
    pub children: Vec<Node>,
    /// Formatted connection descriptors with this node as the source
    pub signals: Vec<String>,
}

impl Node {
    /// Create an empty node
    pub fn new(name: impl Into<String>, kind: NodeKind, type_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name,
            properties: IndexMap::new(),
            children: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Whether the node renders under the fixed `ROOT` label
    pub fn is_synthetic_root(&self) -> bool {
        match self.kind {
            NodeKind::ResourceRoot => true,
            NodeKind::SceneRoot => self.name.is_empty(),
            _ => false,
        }
    }
}

/// A parsed document
#[derive(Debug, Default)]
pub struct Document {
    /// Scene roots, or the single resource root of a `.tres`
    pub roots: Vec<Node>,
    /// External resource id -> alias
    pub aliases: HashMap<String, String>,
    /// Sub-resource id -> resource node
    pub sub_resources: HashMap<String, Node>,
}

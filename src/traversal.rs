//! Document traversal - node tree → raw containers
//!
//! Walks a host document's node tree and picks out containers that have the
//! shape of a form: enough input-like descendants and something that reads
//! like a call-to-action. Once a container matches, its subtree is not
//! searched further.

use crate::scanner::{RawContainer, RawNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role tags a container may carry explicitly
pub const CONTAINER_ROLES: &[&str] = &["container-form", "container-filter"];

const INPUT_KEYWORDS: &[&str] = &["input", "field", "text"];

const PRIMARY_KEYWORDS: &[&str] = &[
    "submit", "save", "apply", "button", "sign", "login", "register", "confirm", "send",
];

/// Kind of node in the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Frame,
    Component,
    Instance,
    Text,
    Group,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Only frames, components and instances can hold a pattern
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Frame | Self::Component | Self::Instance)
    }
}

/// A node of the host document with its plugin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub plugin_data: HashMap<String, String>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            plugin_data: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.plugin_data.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children;
        self
    }

    /// Plugin data value, `None` when unset or empty
    pub fn data(&self, key: &str) -> Option<&str> {
        self.plugin_data
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn to_raw_node(&self) -> RawNode {
        RawNode {
            id: self.id.clone(),
            name: self.name.clone(),
            role: Some(self.data("role").unwrap_or_default().to_string()),
            children: Vec::new(),
        }
    }

    /// This node and all descendants, pre-order
    pub fn flatten(&self) -> Vec<RawNode> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<RawNode>) {
        out.push(self.to_raw_node());
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// At least two input-like nodes and one primary-action-like node
fn has_form_shape(nodes: &[RawNode]) -> bool {
    let mut inputs = 0;
    let mut primary = 0;

    for node in nodes {
        let label = match node.role.as_deref() {
            Some(role) if !role.is_empty() => role,
            _ => node.name.as_str(),
        };
        if contains_any(label, INPUT_KEYWORDS) {
            inputs += 1;
        }
        if contains_any(label, PRIMARY_KEYWORDS) {
            primary += 1;
        }
    }

    inputs >= 2 && primary >= 1
}

/// Collect the outermost form-shaped containers under `node`
pub fn walk_tree<'a>(node: &'a DocumentNode, out: &mut Vec<&'a DocumentNode>) {
    if !node.kind.is_container() {
        return;
    }

    if has_form_shape(&node.flatten()) {
        out.push(node);
        return;
    }

    for child in &node.children {
        walk_tree(child, out);
    }
}

fn infer_container_role(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if lower.contains("form") {
        Some("container-form")
    } else if lower.contains("filter") {
        Some("container-filter")
    } else {
        None
    }
}

fn to_container(node: &DocumentNode) -> RawContainer {
    let role = node
        .data("role")
        .filter(|r| CONTAINER_ROLES.contains(r))
        .or_else(|| infer_container_role(&node.name))
        .unwrap_or("container-form");

    let tag = |key: &str| Some(node.data(key).unwrap_or("unknown").to_string());

    RawContainer {
        id: node.id.clone(),
        name: node.name.clone(),
        role: Some(role.to_string()),
        behavior: tag("behavior"),
        intent: tag("intent"),
        context: tag("context"),
        children: node.flatten(),
    }
}

/// Raw containers found under every root, in document order
pub fn pattern_containers(roots: &[DocumentNode]) -> Vec<RawContainer> {
    let mut found = Vec::new();
    for root in roots {
        walk_tree(root, &mut found);
    }

    found.into_iter().map(to_container).collect()
}

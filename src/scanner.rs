//! Pattern Scanner - raw containers → form/filter patterns
//!
//! The scanner resolves every child of a container to a semantic role, then
//! keeps only containers that look like a real form or filter: at least two
//! inputs and a primary call-to-action. Anything else is dropped silently.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Keywords that mark a child as an input, checked first
const INPUT_KEYWORDS: &[&str] = &["input", "field", "text"];

/// Keywords that mark a child as a primary action
const PRIMARY_KEYWORDS: &[&str] = &["submit", "save", "apply", "button"];

/// Keywords that mark a child as a secondary action
const SECONDARY_KEYWORDS: &[&str] = &["cancel", "reset", "back"];

/// Keywords that mark a child as feedback text
const FEEDBACK_KEYWORDS: &[&str] = &["feedback", "error", "success", "message"];

/// Minimum number of inputs for a container to count as a pattern
pub const MIN_INPUTS: usize = 2;

/// A child element descriptor supplied by the document traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    pub name: String,

    /// Explicit role tag; empty or missing means "infer from name"
    #[serde(default)]
    pub role: Option<String>,

    /// Nested descriptors (not resolved by the scanner)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// Node without an explicit role
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: None,
            children: Vec::new(),
        }
    }

    /// Node carrying an explicit role tag
    pub fn with_role(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: Some(role.into()),
            children: Vec::new(),
        }
    }
}

/// An identified UI container, read-only input to the scanner
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawContainer {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// `container-form` or `container-filter`; anything else is rejected
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub behavior: Option<String>,

    #[serde(default)]
    pub intent: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub children: Vec<RawNode>,
}

/// Semantic role of a child element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentRole {
    Input,
    ActionPrimary,
    ActionSecondary,
    Feedback,
    Unknown,
}

impl ComponentRole {
    /// Parse an explicit role tag. Unrecognized tags resolve to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "input" => Self::Input,
            "action-primary" => Self::ActionPrimary,
            "action-secondary" => Self::ActionSecondary,
            "feedback" => Self::Feedback,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::ActionPrimary => "action-primary",
            Self::ActionSecondary => "action-secondary",
            Self::Feedback => "feedback",
            Self::Unknown => "unknown",
        }
    }

    /// Primary or secondary action
    pub fn is_action(&self) -> bool {
        matches!(self, Self::ActionPrimary | Self::ActionSecondary)
    }
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child element resolved to a semantic role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub id: String,
    pub name: String,
    pub role: ComponentRole,
}

impl ComponentRef {
    /// Resolve a raw node: explicit tag wins, otherwise infer from the name
    pub fn resolve(node: &RawNode) -> Self {
        let role = match node.role.as_deref() {
            Some(tag) if !tag.is_empty() => ComponentRole::from_tag(tag),
            _ => infer_role(&node.name),
        };

        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            role,
        }
    }
}

/// Kind of pattern a container represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Form,
    Filter,
}

impl PatternType {
    /// Map a container role tag to a pattern type
    pub fn from_container_role(role: &str) -> Option<Self> {
        match role {
            "container-form" => Some(Self::Form),
            "container-filter" => Some(Self::Filter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Filter => "filter",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container confirmed to be a meaningful form or filter
///
/// Always holds at least [`MIN_INPUTS`] inputs and one primary action;
/// [`Pattern::new`] refuses anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    id: String,
    #[serde(rename = "type")]
    pattern_type: PatternType,
    inputs: Vec<ComponentRef>,
    actions: Vec<ComponentRef>,
    behavior: String,
    intent: String,
    context: String,
}

impl Pattern {
    /// Build a pattern, returning `None` when the structural invariant fails
    ///
    /// `inputs` must all carry the `Input` role and `actions` must all be
    /// actions; mismatched entries count as invalid.
    pub fn new(
        id: impl Into<String>,
        pattern_type: PatternType,
        inputs: Vec<ComponentRef>,
        actions: Vec<ComponentRef>,
        behavior: impl Into<String>,
        intent: impl Into<String>,
        context: impl Into<String>,
    ) -> Option<Self> {
        if inputs.len() < MIN_INPUTS || inputs.iter().any(|c| c.role != ComponentRole::Input) {
            return None;
        }
        if actions.iter().any(|c| !c.role.is_action()) {
            return None;
        }
        if !actions.iter().any(|c| c.role == ComponentRole::ActionPrimary) {
            return None;
        }

        Some(Self {
            id: id.into(),
            pattern_type,
            inputs,
            actions,
            behavior: behavior.into(),
            intent: intent.into(),
            context: context.into(),
        })
    }

    /// Recognize a pattern in a raw container
    pub fn from_container(container: &RawContainer) -> Option<Self> {
        let pattern_type = PatternType::from_container_role(container.role.as_deref()?)?;

        let (inputs, others): (Vec<ComponentRef>, Vec<ComponentRef>) = container
            .children
            .iter()
            .map(ComponentRef::resolve)
            .partition(|c| c.role == ComponentRole::Input);
        let actions: Vec<ComponentRef> = others.into_iter().filter(|c| c.role.is_action()).collect();

        Self::new(
            container.id.clone(),
            pattern_type,
            inputs,
            actions,
            non_empty_or(&container.behavior, "unknown"),
            non_empty_or(&container.intent, "unknown"),
            non_empty_or(&container.context, "default"),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    pub fn inputs(&self) -> &[ComponentRef] {
        &self.inputs
    }

    pub fn actions(&self) -> &[ComponentRef] {
        &self.actions
    }

    pub fn behavior(&self) -> &str {
        &self.behavior
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

fn non_empty_or(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Infer a role from an element name (case-insensitive, first match wins)
pub fn infer_role(name: &str) -> ComponentRole {
    let lower = name.to_lowercase();

    if contains_any(&lower, INPUT_KEYWORDS) {
        ComponentRole::Input
    } else if contains_any(&lower, PRIMARY_KEYWORDS) {
        ComponentRole::ActionPrimary
    } else if contains_any(&lower, SECONDARY_KEYWORDS) {
        ComponentRole::ActionSecondary
    } else if contains_any(&lower, FEEDBACK_KEYWORDS) {
        ComponentRole::Feedback
    } else {
        ComponentRole::Unknown
    }
}

/// Extract patterns from containers, preserving input order
pub fn scan_patterns(containers: &[RawContainer]) -> Vec<Pattern> {
    containers
        .iter()
        .filter_map(|container| {
            let pattern = Pattern::from_container(container)?;
            debug!(
                id = %container.id,
                name = %container.name,
                pattern_type = %pattern.pattern_type,
                inputs = pattern.inputs.len(),
                actions = pattern.actions.len(),
                "scanned pattern"
            );
            Some(pattern)
        })
        .collect()
}

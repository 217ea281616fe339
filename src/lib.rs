//! # Pattern Pal
//!
//! A design-linting pipeline that finds recurring form and filter patterns in
//! a design document, groups them by structural fingerprint, and flags
//! behavioral inconsistencies between patterns that should behave alike.
//!
//! ## Pipeline
//!
//! ```text
//! RawContainer[] → scan → Pattern[] → normalize → NormalizedPattern[]
//!                → cluster → Cluster[] → insights (+ memory) → mood
//! ```
//!
//! | Stage | Input | Output | State |
//! |-------|-------|--------|-------|
//! | **Scanner** | raw containers | patterns (≥2 inputs, ≥1 primary action) | none |
//! | **Normalizer** | pattern | fingerprint `type-intent-range-context` | none |
//! | **Cluster Engine** | normalized patterns | clusters + divergences | none |
//! | **Insight Generator** | clusters, memory | file / cross-file messages | none |
//! | **Memory Store** | fingerprints, behaviors | frequency table per fingerprint | persisted |
//! | **Mood Synthesizer** | divergence count | calm → overstimulated | none |
//!
//! Only the memory store outlives a run. It is a bounded table with
//! least-recently-seen eviction, persisted as one value through a
//! [`StorageAdapter`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use pattern_pal::{Analyzer, InMemoryStorage, RawContainer, RawNode};
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let login = RawContainer {
//!     id: "login".into(),
//!     name: "Login Form".into(),
//!     role: Some("container-form".into()),
//!     behavior: Some("submit-validation".into()),
//!     intent: Some("create".into()),
//!     context: Some("page".into()),
//!     children: vec![
//!         RawNode::with_role("email", "Email", "input"),
//!         RawNode::with_role("password", "Password", "input"),
//!         RawNode::with_role("submit", "Sign In", "action-primary"),
//!     ],
//! };
//!
//! let analyzer = Analyzer::new(InMemoryStorage::new());
//! let report = analyzer.analyze(&[login]).await?;
//!
//! println!("{}: {}", report.formagotchi.mood, report.formagotchi.line);
//! for insight in &report.insights.file_insights {
//!     println!("{}", insight.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod annotations;
pub mod clustering;
pub mod error;
pub mod insights;
pub mod memory;
pub mod mood;
pub mod normalizer;
pub mod pipeline;
pub mod scanner;
pub mod storage;
pub mod traversal;

// Re-exports
pub use crate::annotations::{
    annotation_name, annotation_text, is_annotation_name, plan_annotations, AnnotationPlan, Rgb,
};
pub use crate::clustering::{cluster_patterns, total_divergences, Cluster};
pub use crate::error::{Error, Result};
pub use crate::insights::{
    generate_cross_file_insights, generate_file_insights, generate_insights, Insight,
    InsightResult, InsightSource,
};
pub use crate::memory::{
    evict_memory, load_memory, save_memory, update_memory, update_memory_at, Memory, MemoryEntry,
    MemoryPolicy, DEFAULT_MAX_ENTRIES, DEFAULT_MEMORY_KEY,
};
pub use crate::mood::{formagotchi_state, formagotchi_state_with, FormagotchiState, Mood, MoodPolicy};
pub use crate::normalizer::{
    field_count_range, normalize_pattern, normalize_patterns, FieldCountRange, NormalizedPattern,
};
pub use crate::pipeline::{AnalysisReport, Analyzer, PipelineConfig};
pub use crate::scanner::{
    infer_role, scan_patterns, ComponentRef, ComponentRole, Pattern, PatternType, RawContainer,
    RawNode,
};
pub use crate::storage::{InMemoryStorage, JsonFileStorage, StorageAdapter};
pub use crate::traversal::{pattern_containers, walk_tree, DocumentNode, NodeKind};

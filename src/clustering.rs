//! Cluster Engine - group normalized patterns by fingerprint
//!
//! Clusters come out in the order their fingerprints first appear, and members
//! keep input order. The only structural inconsistency detected here is a
//! cluster whose members disagree on `behavior`.

use crate::normalizer::NormalizedPattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// All normalized patterns sharing one fingerprint in a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// `"{type} · {intent} · {fieldCountRange} fields · {context}"`
    pub label: String,
    pub fingerprint: String,
    pub patterns: Vec<NormalizedPattern>,
    pub divergences: Vec<String>,
}

impl Cluster {
    /// Build a cluster from a non-empty group of same-fingerprint patterns
    fn from_group(fingerprint: String, patterns: Vec<NormalizedPattern>) -> Self {
        let first = &patterns[0];
        let label = format!(
            "{} · {} · {} fields · {}",
            first.pattern_type, first.intent, first.field_count_range, first.context
        );

        let behaviors = distinct_behaviors(&patterns);
        let divergences = if behaviors.len() > 1 {
            vec![format!("Mixed behaviors: {}", behaviors.join(", "))]
        } else {
            Vec::new()
        };

        Self {
            label,
            fingerprint,
            patterns,
            divergences,
        }
    }

    /// Distinct behaviors among members, in first-seen order
    pub fn behaviors(&self) -> Vec<&str> {
        distinct_behaviors(&self.patterns)
    }

    pub fn is_consistent(&self) -> bool {
        self.divergences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn distinct_behaviors(patterns: &[NormalizedPattern]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for p in patterns {
        if !seen.contains(&p.behavior.as_str()) {
            seen.push(&p.behavior);
        }
    }
    seen
}

/// Partition patterns into fingerprint clusters
pub fn cluster_patterns(patterns: &[NormalizedPattern]) -> Vec<Cluster> {
    let mut groups: IndexMap<&str, Vec<NormalizedPattern>> = IndexMap::new();

    for p in patterns {
        groups.entry(p.fingerprint.as_str()).or_default().push(p.clone());
    }

    groups
        .into_iter()
        .map(|(fingerprint, group)| Cluster::from_group(fingerprint.to_string(), group))
        .collect()
}

/// Sum of divergence messages across clusters
pub fn total_divergences(clusters: &[Cluster]) -> usize {
    clusters.iter().map(|c| c.divergences.len()).sum()
}

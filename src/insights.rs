//! Insight Generator - human-readable findings
//!
//! File insights look at the clusters of the current run alone. Cross-file
//! insights compare each cluster against the historical majority behavior
//! recorded in memory for its fingerprint.
//!
//! Majority votes use a strict `>` over an insertion-ordered tally, so the
//! behavior seen first wins exact ties.

use crate::clustering::Cluster;
use crate::memory::Memory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Message emitted when the only cluster has no divergences
pub const ALL_CONSISTENT: &str = "All patterns are consistent!";

/// Where an insight was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightSource {
    /// Current document only
    ThisFile,
    /// Current document compared against memory
    AcrossFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub source: InsightSource,
    pub message: String,
}

impl Insight {
    pub fn this_file(message: impl Into<String>) -> Self {
        Self {
            source: InsightSource::ThisFile,
            message: message.into(),
        }
    }

    pub fn across_files(message: impl Into<String>) -> Self {
        Self {
            source: InsightSource::AcrossFiles,
            message: message.into(),
        }
    }
}

/// Both insight lists of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub file_insights: Vec<Insight>,
    pub cross_file_insights: Vec<Insight>,
}

impl InsightResult {
    pub fn total(&self) -> usize {
        self.file_insights.len() + self.cross_file_insights.len()
    }
}

/// Majority behavior of a cluster and its count
fn cluster_majority(cluster: &Cluster) -> Option<(&str, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for p in &cluster.patterns {
        *counts.entry(p.behavior.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (behavior, count) in counts {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((behavior, count));
        }
    }
    best
}

/// Insights derived from the current document's clusters
pub fn generate_file_insights(clusters: &[Cluster]) -> Vec<Insight> {
    if let [only] = clusters {
        if only.divergences.is_empty() {
            return vec![Insight::this_file(ALL_CONSISTENT)];
        }
    }

    let mut insights = Vec::new();
    for cluster in clusters {
        let Some((majority, majority_count)) = cluster_majority(cluster) else {
            continue;
        };

        let outliers = cluster.patterns.len() - majority_count;
        if outliers > 0 {
            insights.push(Insight::this_file(format!(
                "Most {}s use '{}' — {} differ",
                cluster.patterns[0].pattern_type, majority, outliers
            )));
        }
    }

    insights
}

/// Insights comparing clusters against historical memory
///
/// A cluster yields one insight per distinct current behavior that differs
/// from the memory majority. Clusters without a memory entry, or whose entry
/// has no positive counts, yield nothing. An empty entry is treated as
/// absent rather than compared against an empty `''` majority.
pub fn generate_cross_file_insights(clusters: &[Cluster], memory: &Memory) -> Vec<Insight> {
    let mut insights = Vec::new();

    for cluster in clusters {
        let Some(entry) = memory.get(&cluster.fingerprint) else {
            continue;
        };
        let Some((memory_majority, _)) = entry.majority_behavior() else {
            continue;
        };

        for current in cluster.behaviors() {
            if current != memory_majority {
                insights.push(Insight::across_files(format!(
                    "Across files, '{}' is most common for this pattern — this file uses '{}'",
                    memory_majority, current
                )));
            }
        }
    }

    insights
}

/// File and cross-file insights together
pub fn generate_insights(clusters: &[Cluster], memory: &Memory) -> InsightResult {
    InsightResult {
        file_insights: generate_file_insights(clusters),
        cross_file_insights: generate_cross_file_insights(clusters, memory),
    }
}

//! Annotation plans for divergent clusters
//!
//! Produces the text, name and color of the markers a host would place next
//! to each pattern in a divergent cluster. Drawing them is up to the host.

use crate::clustering::Cluster;
use crate::insights::InsightResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prefix on every annotation name, used to find and remove them later
pub const ANNOTATION_PREFIX: &str = "[Pattern Pal]";

/// Marker color for divergences found in this file
pub const FILE_COLOR: &str = "#FFD966";

/// Marker color for clusters that also disagree with memory
pub const CROSS_FILE_COLOR: &str = "#D9B3FF";

/// Vertical spacing between consecutive markers
pub const VERTICAL_OFFSET: f32 = 20.0;

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let raw = hex.trim_start_matches('#');
        if raw.len() != 6 || !raw.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&raw[range], 16).ok().map(|v| v as f32 / 255.0)
        };

        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// One marker to place next to a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPlan {
    pub pattern_id: String,
    pub name: String,
    pub text: String,
    pub color: Rgb,
    pub cross_file: bool,
    pub offset_index: usize,
    pub vertical_offset: f32,
}

/// Cluster label followed by one divergence per line
pub fn annotation_text(cluster: &Cluster) -> String {
    format!("{}\n{}", cluster.label, cluster.divergences.join("\n"))
}

pub fn annotation_name(label: &str) -> String {
    format!("{} {}", ANNOTATION_PREFIX, label)
}

/// Whether a node name belongs to one of our markers
pub fn is_annotation_name(name: &str) -> bool {
    name.starts_with(ANNOTATION_PREFIX)
}

/// Fingerprints of the clusters behind the cross-file insights
///
/// Each insight is attributed to the first cluster whose first pattern's
/// behavior appears in its message.
fn cross_file_fingerprints<'a>(clusters: &'a [Cluster], insights: &InsightResult) -> HashSet<&'a str> {
    insights
        .cross_file_insights
        .iter()
        .filter_map(|insight| {
            clusters.iter().find(|cluster| {
                cluster
                    .patterns
                    .first()
                    .is_some_and(|p| insight.message.contains(p.behavior.as_str()))
            })
        })
        .map(|cluster| cluster.fingerprint.as_str())
        .collect()
}

/// Plan one marker per pattern of every divergent cluster
pub fn plan_annotations(clusters: &[Cluster], insights: &InsightResult) -> Vec<AnnotationPlan> {
    let file_color = Rgb::from_hex(FILE_COLOR).unwrap_or(Rgb { r: 1.0, g: 0.85, b: 0.4 });
    let cross_color = Rgb::from_hex(CROSS_FILE_COLOR).unwrap_or(Rgb { r: 0.85, g: 0.7, b: 1.0 });

    let cross_file_set = cross_file_fingerprints(clusters, insights);

    let mut plans = Vec::new();
    for cluster in clusters.iter().filter(|c| !c.divergences.is_empty()) {
        let cross_file = cross_file_set.contains(cluster.fingerprint.as_str());
        let name = annotation_name(&cluster.label);
        let text = annotation_text(cluster);

        for pattern in &cluster.patterns {
            let offset_index = plans.len();
            plans.push(AnnotationPlan {
                pattern_id: pattern.pattern_id.clone(),
                name: name.clone(),
                text: text.clone(),
                color: if cross_file { cross_color } else { file_color },
                cross_file,
                offset_index,
                vertical_offset: offset_index as f32 * VERTICAL_OFFSET,
            });
        }
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::cluster_patterns;
    use crate::insights::{generate_insights, Insight};
    use crate::memory::{update_memory_at, Memory};
    use crate::normalizer::{FieldCountRange, NormalizedPattern};
    use crate::scanner::PatternType;

    fn np(id: &str, fingerprint: &str, behavior: &str) -> NormalizedPattern {
        NormalizedPattern {
            pattern_id: id.to_string(),
            fingerprint: fingerprint.to_string(),
            pattern_type: PatternType::Form,
            field_count_range: FieldCountRange::Few,
            behavior: behavior.to_string(),
            intent: "login".to_string(),
            context: "modal".to_string(),
        }
    }

    #[test]
    fn test_annotation_text() {
        let mut cluster = cluster_patterns(&[np("p1", "fp1", "submit"), np("p2", "fp1", "auto-save")])
            .remove(0);
        assert_eq!(
            annotation_text(&cluster),
            "form · login · 1-3 fields · modal\nMixed behaviors: submit, auto-save"
        );

        cluster.divergences.push("Extra divergence".to_string());
        assert!(annotation_text(&cluster).ends_with("auto-save\nExtra divergence"));
    }

    #[test]
    fn test_annotation_name() {
        assert_eq!(annotation_name("form · login"), "[Pattern Pal] form · login");
        assert_eq!(annotation_name(""), "[Pattern Pal] ");
        assert!(is_annotation_name("[Pattern Pal] anything"));
        assert!(!is_annotation_name("Login Form"));
    }

    #[test]
    fn test_rgb_from_hex() {
        let c = Rgb::from_hex("#FF0000").unwrap();
        assert_eq!(c, Rgb { r: 1.0, g: 0.0, b: 0.0 });
        assert!(Rgb::from_hex("#FFF").is_none());
        assert!(Rgb::from_hex("#GG0000").is_none());
    }

    #[test]
    fn test_plans_only_divergent_clusters() {
        let clusters = cluster_patterns(&[
            np("a", "fp1", "submit"),
            np("b", "fp1", "inline"),
            np("c", "fp2", "submit"),
        ]);
        let plans = plan_annotations(&clusters, &InsightResult::default());

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].pattern_id, "a");
        assert_eq!(plans[1].offset_index, 1);
        assert_eq!(plans[1].vertical_offset, 20.0);
        assert!(plans.iter().all(|p| !p.cross_file));
        assert_eq!(plans[0].color, Rgb::from_hex(FILE_COLOR).unwrap());
    }

    #[test]
    fn test_cross_file_color() {
        let clusters = cluster_patterns(&[np("a", "fp1", "inline"), np("b", "fp1", "submit")]);
        let memory = update_memory_at(&Memory::new(), &["fp1", "fp1"], &["submit", "submit"], 1);
        let insights = generate_insights(&clusters, &memory);

        let plans = plan_annotations(&clusters, &insights);
        assert!(plans.iter().all(|p| p.cross_file));
        assert_eq!(plans[0].color, Rgb::from_hex(CROSS_FILE_COLOR).unwrap());

        let unrelated = InsightResult {
            file_insights: Vec::new(),
            cross_file_insights: vec![Insight::across_files("nothing relevant")],
        };
        assert!(plan_annotations(&clusters, &unrelated).iter().all(|p| !p.cross_file));
    }

    #[test]
    fn test_cross_file_color_only_for_remembered_cluster() {
        let clusters = cluster_patterns(&[
            np("a1", "fp1", "inline"),
            np("a2", "fp1", "submit"),
            np("b1", "fp2", "submit"),
            np("b2", "fp2", "inline"),
        ]);
        let memory = update_memory_at(&Memory::new(), &["fp1", "fp1"], &["submit", "submit"], 1);
        let insights = generate_insights(&clusters, &memory);
        assert_eq!(insights.cross_file_insights.len(), 1);

        let plans = plan_annotations(&clusters, &insights);
        assert_eq!(plans.len(), 4);

        let flagged: Vec<(&str, bool)> = plans
            .iter()
            .map(|p| (p.pattern_id.as_str(), p.cross_file))
            .collect();
        assert_eq!(
            flagged,
            vec![("a1", true), ("a2", true), ("b1", false), ("b2", false)]
        );
        assert_eq!(plans[2].color, Rgb::from_hex(FILE_COLOR).unwrap());
    }
}

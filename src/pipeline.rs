//! Pipeline - one analysis run end to end
//!
//! ```text
//! containers → scan → normalize → cluster ─┬─────────────→ insights → mood
//!                                          │                  ↑
//!            storage → load → update → evict → save ──────────┘
//! ```
//!
//! The memory round trip is the only step with I/O. An [`Analyzer`] holds a
//! lock across load/update/evict/save, so concurrent runs against the same
//! analyzer never interleave their reads and writes.

use crate::clustering::{cluster_patterns, total_divergences, Cluster};
use crate::error::{Error, Result};
use crate::insights::{generate_insights, InsightResult};
use crate::memory::{evict_memory, load_memory, save_memory, update_memory, Memory, MemoryPolicy};
use crate::mood::{formagotchi_state_with, FormagotchiState, MoodPolicy};
use crate::normalizer::normalize_patterns;
use crate::scanner::{scan_patterns, RawContainer};
use crate::storage::StorageAdapter;
use crate::traversal::{pattern_containers, DocumentNode};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Configuration for an analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Divergence thresholds for each mood
    #[serde(default)]
    pub mood: MoodPolicy,

    /// Memory retention and storage key
    #[serde(default)]
    pub memory: MemoryPolicy,
}

impl PipelineConfig {
    /// Three-mood variant without "annoyed"
    pub fn three_state() -> Self {
        Self {
            mood: MoodPolicy::three_state(),
            memory: MemoryPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.mood.validate()?;
        if self.memory.storage_key.is_empty() {
            return Err(Error::InvalidConfig("storage_key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Save to disk as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        Ok(())
    }

    /// Load from disk and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Everything a run produces for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub run_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub clusters: Vec<Cluster>,
    pub insights: InsightResult,
    pub formagotchi: FormagotchiState,
    pub divergence_count: usize,
    /// Fingerprints held in memory after eviction
    pub memory_size: usize,
}

/// Runs the analysis pipeline against a storage adapter
pub struct Analyzer<S> {
    storage: S,
    config: PipelineConfig,
    memory_lock: Mutex<()>,
}

impl<S: StorageAdapter> Analyzer<S> {
    /// Analyzer with the default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, PipelineConfig::default())
    }

    pub fn with_config(storage: S, config: PipelineConfig) -> Self {
        Self {
            storage,
            config,
            memory_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Analyze containers with an entropy-seeded random source
    pub async fn analyze(&self, containers: &[RawContainer]) -> Result<AnalysisReport> {
        let mut rng = StdRng::from_entropy();
        self.analyze_with_rng(containers, &mut rng).await
    }

    /// Walk a document tree, then analyze the containers found
    pub async fn analyze_document(&self, roots: &[DocumentNode]) -> Result<AnalysisReport> {
        let containers = pattern_containers(roots);
        debug!(roots = roots.len(), containers = containers.len(), "traversed document");
        self.analyze(&containers).await
    }

    /// Analyze containers, drawing the mood line from `rng`
    pub async fn analyze_with_rng<R: Rng + Send + ?Sized>(
        &self,
        containers: &[RawContainer],
        rng: &mut R,
    ) -> Result<AnalysisReport> {
        let patterns = scan_patterns(containers);
        let normalized = normalize_patterns(&patterns);
        let clusters = cluster_patterns(&normalized);

        info!(
            containers = containers.len(),
            patterns = patterns.len(),
            clusters = clusters.len(),
            "scanned document"
        );
        for cluster in clusters.iter().filter(|c| !c.divergences.is_empty()) {
            debug!(
                fingerprint = %cluster.fingerprint,
                patterns = cluster.patterns.len(),
                divergences = %cluster.divergences.join("; "),
                "divergent cluster"
            );
        }

        let fingerprints: Vec<&str> = normalized.iter().map(|p| p.fingerprint.as_str()).collect();
        let behaviors: Vec<&str> = normalized.iter().map(|p| p.behavior.as_str()).collect();
        let memory = self.record(&fingerprints, &behaviors).await?;

        let insights = generate_insights(&clusters, &memory);
        let divergence_count = total_divergences(&clusters);
        let formagotchi =
            formagotchi_state_with(&self.config.mood, divergence_count, memory.len(), rng);

        info!(
            file_insights = insights.file_insights.len(),
            cross_file_insights = insights.cross_file_insights.len(),
            divergences = divergence_count,
            memory = memory.len(),
            mood = %formagotchi.mood,
            "analysis complete"
        );

        Ok(AnalysisReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            analyzed_at: Utc::now(),
            clusters,
            insights,
            formagotchi,
            divergence_count,
            memory_size: memory.len(),
        })
    }

    /// Load, update, evict and save memory under the lock
    async fn record(&self, fingerprints: &[&str], behaviors: &[&str]) -> Result<Memory> {
        let _guard = self.memory_lock.lock().await;
        let key = self.config.memory.storage_key.as_str();

        let loaded = load_memory(&self.storage, key).await?;
        let updated = update_memory(&loaded, fingerprints, behaviors);
        let evicted = evict_memory(&updated, self.config.memory.max_entries);
        save_memory(&self.storage, key, &evicted).await?;

        info!(before = loaded.len(), after = evicted.len(), "memory updated");
        Ok(evicted)
    }

    /// Current persisted memory
    pub async fn memory(&self) -> Result<Memory> {
        let _guard = self.memory_lock.lock().await;
        load_memory(&self.storage, &self.config.memory.storage_key).await
    }
}

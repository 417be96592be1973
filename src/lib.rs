use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::analysis::ela::ElaGenerator;
use crate::error::Result;
use crate::hash::{ContentFingerprint, ContentHasher};
use crate::metadata::exif::MetadataExtractor;
use crate::metadata::MetadataSnapshot;
use crate::scoring::authenticity::AuthenticityScorer;
use crate::scoring::evidence::EvidenceScorer;
use crate::scoring::{EvidenceReport, ScoreReport};
use crate::simulate::{EditDiff, EditSimulator};
use crate::storage::UploadStore;

pub mod analysis;
pub mod error;
pub mod hash;
pub mod metadata;
pub mod scoring;
pub mod simulate;
pub mod storage;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ela_quality: u8,
    pub hash_chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ela_quality: ElaGenerator::DEFAULT_QUALITY,
            hash_chunk_size: 8192,
        }
    }
}

/// Caller-supplied digests to check an upload against. Blank entries are
/// treated as "no expectation".
#[derive(Debug, Clone, Default)]
pub struct HashExpectation {
    pub sha256: Option<String>,
    pub md5: Option<String>,
}

impl HashExpectation {
    fn sha256_match(&self, fingerprint: &ContentFingerprint) -> Option<bool> {
        self.sha256
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| fingerprint.matches_sha256(s))
    }

    fn md5_match(&self, fingerprint: &ContentFingerprint) -> Option<bool> {
        self.md5
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| fingerprint.matches_md5(s))
    }
}

/// Everything produced by one pass over an uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    #[serde(flatten)]
    pub fingerprint: ContentFingerprint,
    pub stored_name: String,
    pub ela_filename: String,
    pub metadata: MetadataSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_match: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_match: Option<bool>,
}

impl AnalysisOutcome {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    #[serde(flatten)]
    pub report: ScoreReport,
    pub metadata: MetadataSnapshot,
}

/// Facade over the forensic pipeline. One instance owns a storage
/// directory; all operations are synchronous and share no mutable state.
pub struct AuthenticityEngine {
    store: UploadStore,
    config: EngineConfig,
}

impl AuthenticityEngine {
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> Result<Self> {
        Ok(Self {
            store: UploadStore::open(storage_dir)?,
            config: EngineConfig::default(),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn storage(&self) -> &UploadStore {
        &self.store
    }

    /// Runs the single ingest pass: fingerprint the bytes, store them,
    /// extract metadata, and render the ELA visualization.
    pub fn analyze_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        expected: &HashExpectation,
    ) -> Result<AnalysisOutcome> {
        // Input validation happens before any processing.
        let file_name = storage::sanitize_name(file_name)?;

        let fingerprint = ContentHasher::new()
            .with_chunk_size(self.config.hash_chunk_size)
            .hash_bytes(bytes)?;

        let stored_name = self.store.save(file_name, &fingerprint.sha256, bytes)?;
        let path = self.store.path_of(&stored_name);

        let metadata =
            MetadataExtractor::extract_with_name(&path, UploadStore::display_name(&stored_name))?;

        let ela_filename = UploadStore::ela_name(&stored_name);
        let ela = ElaGenerator::new()
            .with_quality(self.config.ela_quality)
            .generate(&path, self.store.path_of(&ela_filename))?;
        log::debug!(
            "analyzed {stored_name}: max ELA difference {}, scale {:.2}",
            ela.max_difference,
            ela.scale
        );

        Ok(AnalysisOutcome {
            sha256_match: expected.sha256_match(&fingerprint),
            md5_match: expected.md5_match(&fingerprint),
            fingerprint,
            stored_name,
            ela_filename,
            metadata,
        })
    }

    /// Scores a previously analyzed upload, returning the report together
    /// with the snapshot it was computed from.
    pub fn verify_authenticity(&self, stored_name: &str) -> Result<VerificationOutcome> {
        let path = self.store.resolve(stored_name)?;
        let metadata =
            MetadataExtractor::extract_with_name(&path, UploadStore::display_name(stored_name))?;
        let report = AuthenticityScorer::score(&metadata);
        Ok(VerificationOutcome { report, metadata })
    }

    /// Independent heuristic opinion over any metadata field mapping, not
    /// necessarily one this engine produced.
    pub fn ai_analyze(&self, fields: &HashMap<String, String>) -> EvidenceReport {
        EvidenceScorer::score(fields)
    }

    /// What-if re-flagging of a stored upload with proposed field edits.
    /// Stored data is never modified.
    pub fn simulate_edits(
        &self,
        stored_name: &str,
        edits: &HashMap<String, String>,
    ) -> Result<EditDiff> {
        let path = self.store.resolve(stored_name)?;
        let metadata =
            MetadataExtractor::extract_with_name(&path, UploadStore::display_name(stored_name))?;
        Ok(EditSimulator::simulate(&metadata, edits))
    }
}

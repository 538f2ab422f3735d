//! Notice analyzer
//!
//! Ties the stages together: load a notice, find relevant documents and
//! criteria, suggest patches for the criteria a caller keeps, and apply them.
//! The caller owns the notice throughout; each stage borrows it only for the
//! duration of the call.

use crate::config::AnalyzerConfig;
use crate::error::GppError;
use crate::result::AnalysisResult;
use gpp_knowledge::{DomainKnowledgeIndex, SuggestedCriterion};
use gpp_notice::Notice;
use gpp_patch::{PatchApplier, SchemaOrder, SuggestedPatch, WeightRedistributor};
use tracing::{debug, error, info};

/// Analysis and patching operations over notices
pub trait NoticeAnalyzer {
    /// Parse notice text
    ///
    /// # Errors
    /// Returns [`GppError::BadRequest`] if the text is not a well-formed notice.
    fn load_notice(&self, xml: &str) -> Result<Notice, GppError>;

    /// Relevant documents and per-lot criteria
    fn analyze_notice(&self, notice: &Notice) -> AnalysisResult;

    /// Patches for the given suggested criteria
    ///
    /// # Errors
    /// Returns [`GppError::Internal`] if patch templates depend on each other
    /// in a cycle.
    fn suggest_patches(
        &self,
        notice: &Notice,
        suggested: &[SuggestedCriterion],
    ) -> Result<Vec<SuggestedPatch>, GppError>;

    /// Apply patches in order, then resolve placeholder weights
    ///
    /// # Errors
    /// Returns [`GppError::BadRequest`] on the first patch that fails.
    /// Patches before it remain applied.
    fn apply_patches(&self, notice: &mut Notice, patches: &[SuggestedPatch])
        -> Result<(), GppError>;
}

/// Analyzer backed by loaded domain knowledge and schema order
#[derive(Debug, Clone)]
pub struct DefaultNoticeAnalyzer {
    config: AnalyzerConfig,
    index: DomainKnowledgeIndex,
    applier: PatchApplier,
    weights: WeightRedistributor,
}

impl DefaultNoticeAnalyzer {
    /// Load record files and schema order named in `config`
    ///
    /// # Errors
    /// Returns [`GppError::BadRequest`] for a missing record file and
    /// [`GppError::Internal`] for a malformed one or an unusable schema.
    pub fn new(config: AnalyzerConfig) -> Result<Self, GppError> {
        let index = DomainKnowledgeIndex::load(&config.knowledge).map_err(|e| {
            error!(error = %e, "failed to load domain knowledge");
            GppError::from(e)
        })?;
        let schema = SchemaOrder::load(&config.sdk_root, &config.sdk_version, &config.schema_type)
            .map_err(|e| {
                error!(error = %e, "failed to load schema order");
                GppError::from(e)
            })?;
        Ok(Self::from_parts(config, index, schema))
    }

    /// Assemble from already loaded parts
    #[must_use]
    pub fn from_parts(config: AnalyzerConfig, index: DomainKnowledgeIndex, schema: SchemaOrder) -> Self {
        let weights = WeightRedistributor::new(config.gpp_weight_share);
        info!(
            sdk_version = %config.sdk_version,
            ambition = %config.ambition_level,
            share = weights.share(),
            "notice analyzer ready"
        );
        Self {
            config,
            index,
            applier: PatchApplier::with_schema(schema),
            weights,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Domain knowledge in use
    #[inline]
    #[must_use]
    pub fn index(&self) -> &DomainKnowledgeIndex {
        &self.index
    }

    /// Parse a JSON array of suggested patches
    ///
    /// # Errors
    /// Returns [`GppError::BadRequest`] naming the offending content, e.g. an
    /// unknown operation.
    pub fn parse_patches(json: &str) -> Result<Vec<SuggestedPatch>, GppError> {
        serde_json::from_str(json).map_err(|e| GppError::bad_request(format!("invalid patch: {e}")))
    }

    /// Parse a JSON array of suggested criteria
    ///
    /// # Errors
    /// Returns [`GppError::BadRequest`] if the JSON does not describe criteria.
    pub fn parse_suggested_criteria(json: &str) -> Result<Vec<SuggestedCriterion>, GppError> {
        serde_json::from_str(json)
            .map_err(|e| GppError::bad_request(format!("invalid suggested criteria: {e}")))
    }
}

impl NoticeAnalyzer for DefaultNoticeAnalyzer {
    fn load_notice(&self, xml: &str) -> Result<Notice, GppError> {
        let notice = Notice::parse_with(xml, &self.config.namespaces, &self.config.layout)?;
        info!(%notice, "notice loaded");
        Ok(notice)
    }

    fn analyze_notice(&self, notice: &Notice) -> AnalysisResult {
        let lot_ids = notice.lot_ids();

        let mut codes = notice.all_project_codes();
        for lot_id in &lot_ids {
            for code in notice.all_lot_codes(lot_id) {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
        }
        let relevant_gpp_documents = self.index.relevant_documents(&codes);

        let mut suggested_gpp_criteria = Vec::new();
        for lot_id in &lot_ids {
            let lot_codes = notice.effective_lot_codes(lot_id);
            let criteria = self
                .index
                .relevant_criteria(&lot_codes, self.config.ambition_level);
            debug!(lot_id = %lot_id, codes = ?lot_codes, criteria = criteria.len(), "lot analyzed");
            suggested_gpp_criteria.extend(self.index.to_suggested_criteria(&criteria, lot_id, &lot_codes));
        }

        info!(
            documents = relevant_gpp_documents.len(),
            criteria = suggested_gpp_criteria.len(),
            lots = lot_ids.len(),
            "notice analyzed"
        );
        AnalysisResult {
            relevant_gpp_documents,
            suggested_gpp_criteria,
        }
    }

    fn suggest_patches(
        &self,
        notice: &Notice,
        suggested: &[SuggestedCriterion],
    ) -> Result<Vec<SuggestedPatch>, GppError> {
        self.index.suggest_patches(notice, suggested).map_err(|e| {
            error!(error = %e, "patch suggestion failed");
            GppError::from(e)
        })
    }

    fn apply_patches(
        &self,
        notice: &mut Notice,
        patches: &[SuggestedPatch],
    ) -> Result<(), GppError> {
        let original = notice.clone();
        self.applier.apply_all(notice, patches)?;
        let weights = self.weights.redistribute(notice, &original);
        info!(patches = patches.len(), weights, "patches applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpp_knowledge::KnowledgePaths;
    use gpp_test_utils::{criteria_path, documents_path, fixtures, patches_path, sdk_root};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn config() -> AnalyzerConfig {
        AnalyzerConfig::new()
            .with_knowledge_paths(KnowledgePaths::new(documents_path(), criteria_path(), patches_path()))
            .with_sdk_root(sdk_root())
    }

    #[test]
    fn construction_loads_everything() {
        let analyzer = DefaultNoticeAnalyzer::new(config()).unwrap();
        assert_eq!(analyzer.index().templates().len(), 10);
    }

    #[test]
    fn missing_patches_file_is_bad_request() {
        let mut paths = KnowledgePaths::new(documents_path(), criteria_path(), patches_path());
        paths.patches = PathBuf::from("/nonexistent/gpp_patches.json");
        let err = DefaultNoticeAnalyzer::new(config().with_knowledge_paths(paths)).unwrap_err();
        assert_eq!(
            err,
            GppError::bad_request("invalid GPP patches file path: /nonexistent/gpp_patches.json")
        );
    }

    #[test]
    fn missing_schema_is_internal() {
        let err = DefaultNoticeAnalyzer::new(config().with_sdk_version("0.0")).unwrap_err();
        assert!(!err.is_bad_request(), "{err}");
    }

    #[test]
    fn analysis_covers_project_and_lot_codes() {
        let analyzer = DefaultNoticeAnalyzer::new(config()).unwrap();
        let notice = analyzer.load_notice(fixtures::TEST_NOTICE_MINIMAL).unwrap();
        let result = analyzer.analyze_notice(&notice);

        let names: Vec<&str> = result
            .relevant_gpp_documents
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["EU GPP Criteria for Furniture"]);
        assert_eq!(result.criteria_for_lot("LOT-0001").count(), 0);
        let ids: Vec<&str> = result.criteria_for_lot("lot-0002").map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["AC1", "TS3", "CPC1"]);
    }

    #[test]
    fn bad_operation_is_bad_request() {
        let err = DefaultNoticeAnalyzer::parse_patches(
            r#"[{"name":"x","path":".","op":"invalidOp","lotId":"LOT-0001"}]"#,
        )
        .unwrap_err();
        assert!(err.is_bad_request());
        assert!(err.message().contains("invalid patch operation: invalidOp"), "{err}");
    }
}

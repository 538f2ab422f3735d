//! In-memory domain knowledge
//!
//! Immutable after construction; shared freely across analyses.

use crate::error::{LoadError, SuggestError};
use crate::loader::{load_criteria, load_documents, load_patches, KnowledgePaths};
use crate::model::{AmbitionLevel, Criterion, PatchTemplate, ReferenceDocument, SuggestedCriterion};
use crate::suggester::PatchSuggester;
use gpp_notice::Notice;
use gpp_patch::SuggestedPatch;
use indexmap::IndexMap;
use tracing::{info, warn};

/// Reference documents, criteria and patch templates
#[derive(Debug, Clone, Default)]
pub struct DomainKnowledgeIndex {
    documents: Vec<ReferenceDocument>,
    criteria: Vec<Criterion>,
    suggester: PatchSuggester,
}

impl DomainKnowledgeIndex {
    /// Create from loaded collections
    #[must_use]
    pub fn new(
        documents: Vec<ReferenceDocument>,
        criteria: Vec<Criterion>,
        templates: Vec<PatchTemplate>,
    ) -> Self {
        Self {
            documents,
            criteria,
            suggester: PatchSuggester::new(templates),
        }
    }

    /// Load all three collections, failing on the first that cannot be read
    ///
    /// # Errors
    /// Returns [`LoadError`] naming the failing collection.
    pub fn load(paths: &KnowledgePaths) -> Result<Self, LoadError> {
        let documents = load_documents(&paths.documents)?;
        let criteria = load_criteria(&paths.criteria)?;
        let templates = load_patches(&paths.patches)?;
        info!(
            documents = documents.len(),
            criteria = criteria.len(),
            templates = templates.len(),
            "domain knowledge loaded"
        );
        Ok(Self::new(documents, criteria, templates))
    }

    /// All reference documents
    #[inline]
    #[must_use]
    pub fn documents(&self) -> &[ReferenceDocument] {
        &self.documents
    }

    /// All criteria
    #[inline]
    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// All patch templates
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &[PatchTemplate] {
        self.suggester.templates()
    }

    /// Documents covering any of `codes`
    #[must_use]
    pub fn relevant_documents<S: AsRef<str>>(&self, codes: &[S]) -> Vec<ReferenceDocument> {
        self.documents
            .iter()
            .filter(|d| d.is_applicable(codes))
            .cloned()
            .collect()
    }

    /// Criteria covering any of `codes` at `level`
    #[must_use]
    pub fn relevant_criteria<S: AsRef<str>>(
        &self,
        codes: &[S],
        level: AmbitionLevel,
    ) -> Vec<Criterion> {
        self.criteria
            .iter()
            .filter(|c| c.is_applicable(codes, level))
            .cloned()
            .collect()
    }

    /// Project criteria onto a lot
    #[must_use]
    pub fn to_suggested_criteria<S: AsRef<str>>(
        &self,
        criteria: &[Criterion],
        lot_id: &str,
        lot_codes: &[S],
    ) -> Vec<SuggestedCriterion> {
        criteria
            .iter()
            .map(|c| SuggestedCriterion::from_criterion(c, lot_id, lot_codes))
            .collect()
    }

    /// Patches for the selected suggested criteria
    ///
    /// Suggested criteria are resolved back to full criteria and grouped by
    /// lot in order of first appearance. Unresolvable entries are skipped.
    ///
    /// # Errors
    /// Returns [`SuggestError`] if template prerequisites loop.
    pub fn suggest_patches(
        &self,
        notice: &Notice,
        suggested: &[SuggestedCriterion],
    ) -> Result<Vec<SuggestedPatch>, SuggestError> {
        self.suggester.suggest(notice, &self.group_by_lot(suggested))
    }

    fn group_by_lot(&self, suggested: &[SuggestedCriterion]) -> IndexMap<String, Vec<Criterion>> {
        let mut grouped: IndexMap<String, Vec<Criterion>> = IndexMap::new();
        for entry in suggested {
            match self.criteria.iter().find(|c| c.matches(entry)) {
                Some(criterion) => grouped
                    .entry(entry.lot_id.clone())
                    .or_default()
                    .push(criterion.clone()),
                None => warn!(
                    id = %entry.id,
                    ambition = %entry.ambition_level,
                    document = %entry.gpp_document,
                    lot_id = %entry.lot_id,
                    "no criterion matches suggested criterion"
                ),
            }
        }
        grouped
    }
}

//! Analysis output

use gpp_knowledge::{ReferenceDocument, SuggestedCriterion};
use serde::{Deserialize, Serialize};

/// Documents and criteria relevant to one notice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Documents covering any project or lot code
    pub relevant_gpp_documents: Vec<ReferenceDocument>,
    /// Criteria per lot, in lot order
    pub suggested_gpp_criteria: Vec<SuggestedCriterion>,
}

impl AnalysisResult {
    /// Check if nothing relevant was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relevant_gpp_documents.is_empty() && self.suggested_gpp_criteria.is_empty()
    }

    /// Suggested criteria for one lot
    pub fn criteria_for_lot<'a>(
        &'a self,
        lot_id: &'a str,
    ) -> impl Iterator<Item = &'a SuggestedCriterion> + 'a {
        self.suggested_gpp_criteria
            .iter()
            .filter(move |c| c.lot_id.eq_ignore_ascii_case(lot_id))
    }
}

//! Clause type dispatch
//!
//! Each known criterion type maps to one patch template and fills its own
//! template variables. Unrecognized types are kept as [`ClauseType::Unknown`]
//! so the suggester can report them.

use crate::model::Criterion;
use gpp_patch::{TemplateVars, PLACEHOLDER_WEIGHT};
use std::fmt::{self, Display, Formatter};

/// Template for award criteria and technical specifications
pub const AWARD_CRITERION_TEMPLATE: &str = "Award Criterion";
/// Template for selection criteria
pub const SELECTION_CRITERION_TEMPLATE: &str = "Selection Criterion";
/// Template for contract performance clauses
pub const CONTRACT_PERFORMANCE_TEMPLATE: &str = "Contract Performance Clause";

const WEIGHT_TYPE: &str = "per-exa";
const AWARD_CRITERION_TYPE: &str = "quality";
const DEFAULT_SELECTION_TYPE: &str = "tp-abil";

/// Kind of clause a criterion becomes in the notice
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClauseType {
    /// `award criteria`
    AwardCriterion,
    /// `technical specification`, rendered as an award criterion
    TechnicalSpecification,
    /// `selection criteria`
    SelectionCriterion,
    /// `contract performance clause`
    ContractPerformanceClause,
    /// Type text with no template
    Unknown(String),
}

impl ClauseType {
    /// Template the clause is rendered with
    #[must_use]
    pub fn template_name(&self) -> Option<&'static str> {
        match self {
            Self::AwardCriterion | Self::TechnicalSpecification => Some(AWARD_CRITERION_TEMPLATE),
            Self::SelectionCriterion => Some(SELECTION_CRITERION_TEMPLATE),
            Self::ContractPerformanceClause => Some(CONTRACT_PERFORMANCE_TEMPLATE),
            Self::Unknown(_) => None,
        }
    }

    /// Template variables specific to this clause type
    ///
    /// Values are raw text; escaping is left to the caller.
    #[must_use]
    pub fn variables(&self, criterion: &Criterion) -> TemplateVars {
        let mut vars = TemplateVars::new();
        match self {
            Self::AwardCriterion | Self::TechnicalSpecification => {
                vars.insert("award_criterion_weight_type".into(), WEIGHT_TYPE.into());
                vars.insert("award_criterion_weight".into(), PLACEHOLDER_WEIGHT.into());
                vars.insert("award_criterion_type".into(), AWARD_CRITERION_TYPE.into());
                vars.insert(
                    "name".into(),
                    format!(
                        "{}: {} ({} ambition, {})",
                        criterion.id, criterion.name, criterion.ambition_level, criterion.gpp_document
                    ),
                );
                vars.insert("description".into(), criterion.description.clone());
            }
            Self::SelectionCriterion => {
                let selection_type = criterion
                    .selection_criterion_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(DEFAULT_SELECTION_TYPE);
                vars.insert("selection_criterion_type".into(), selection_type.into());
                vars.insert("description".into(), combined_description(criterion));
            }
            Self::ContractPerformanceClause => {
                vars.insert("description".into(), combined_description(criterion));
            }
            Self::Unknown(_) => {}
        }
        vars
    }
}

impl From<&str> for ClauseType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "award criteria" => Self::AwardCriterion,
            "technical specification" => Self::TechnicalSpecification,
            "selection criteria" => Self::SelectionCriterion,
            "contract performance clause" | "contract performing clause" => {
                Self::ContractPerformanceClause
            }
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl Display for ClauseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwardCriterion => f.write_str("award criteria"),
            Self::TechnicalSpecification => f.write_str("technical specification"),
            Self::SelectionCriterion => f.write_str("selection criteria"),
            Self::ContractPerformanceClause => f.write_str("contract performance clause"),
            Self::Unknown(raw) => write!(f, "unknown clause type '{raw}'"),
        }
    }
}

fn combined_description(criterion: &Criterion) -> String {
    format!("{}: {} - {}", criterion.id, criterion.name, criterion.description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn criterion(criterion_type: &str) -> Criterion {
        Criterion {
            gpp_document: "EU GPP Criteria for Furniture".into(),
            gpp_source: Some("eu".into()),
            category: String::new(),
            criterion_type: criterion_type.into(),
            ambition_level: "core".into(),
            id: "X1".into(),
            name: "Low VOC".into(),
            relevant_cpv_codes: vec![],
            environmental_impact_type: None,
            description: "Emissions below limits.".into(),
            selection_criterion_type: None,
        }
    }

    #[test]
    fn parses_known_types_and_alias() {
        assert_eq!(ClauseType::from("Award Criteria"), ClauseType::AwardCriterion);
        assert_eq!(
            ClauseType::from("contract performing clause"),
            ClauseType::ContractPerformanceClause
        );
        assert_eq!(
            ClauseType::from("framework"),
            ClauseType::Unknown("framework".into())
        );
    }

    #[test]
    fn award_and_technical_share_a_template() {
        assert_eq!(ClauseType::AwardCriterion.template_name(), Some(AWARD_CRITERION_TEMPLATE));
        assert_eq!(
            ClauseType::TechnicalSpecification.template_name(),
            Some(AWARD_CRITERION_TEMPLATE)
        );
        assert_eq!(ClauseType::Unknown("x".into()).template_name(), None);
    }

    #[test]
    fn award_variables_carry_placeholder_weight() {
        let c = criterion("award criteria");
        let vars = c.clause_type().variables(&c);
        assert_eq!(vars["award_criterion_weight"], "dynamic weight");
        assert_eq!(vars["award_criterion_weight_type"], "per-exa");
        assert_eq!(vars["award_criterion_type"], "quality");
        assert_eq!(
            vars["name"],
            "X1: Low VOC (core ambition, EU GPP Criteria for Furniture)"
        );
        assert_eq!(vars["description"], "Emissions below limits.");
    }

    #[test]
    fn selection_type_defaults() {
        let mut c = criterion("selection criteria");
        let vars = c.clause_type().variables(&c);
        assert_eq!(vars["selection_criterion_type"], "tp-abil");
        assert_eq!(vars["description"], "X1: Low VOC - Emissions below limits.");

        c.selection_criterion_type = Some("ef-stand".into());
        assert_eq!(c.clause_type().variables(&c)["selection_criterion_type"], "ef-stand");
    }

    #[test]
    fn unknown_type_has_no_variables() {
        let c = criterion("framework");
        assert!(c.clause_type().variables(&c).is_empty());
    }
}

//! Where things live inside a notice
//!
//! [`NoticeLayout`] holds the path text so it can be overridden from
//! configuration; [`NoticePaths`] is the compiled form used at runtime.

use crate::path::{NodePath, PathError};
use serde::{Deserialize, Serialize};

const STRATEGIC_TYPE: &str = "cac:ProcurementProject/cac:ProcurementAdditionalType\
    [cbc:ProcurementTypeCode/@listName='strategic-procurement']";

/// Path text for every notice location the engine reads
///
/// Lot-relative entries are evaluated from a lot element, project-relative
/// entries from the notice root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeLayout {
    /// Main CPV code of the procurement project
    pub project_main_code: String,
    /// Additional CPV codes of the procurement project
    pub project_additional_codes: String,
    /// Lot elements
    pub lot: String,
    /// Lot identifier, relative to a lot
    pub lot_id: String,
    /// Lot procurement project, relative to a lot
    pub lot_project: String,
    /// Lot main CPV code, relative to a lot
    pub lot_main_code: String,
    /// Lot additional CPV codes, relative to a lot
    pub lot_additional_codes: String,
    /// Notice language code
    pub notice_language: String,
    /// eForms SDK customization id
    pub schema_version: String,
    /// Strategic procurement flag `env-imp`, relative to a lot
    pub strategic_env_impact: String,
    /// Strategic procurement flag `none`, relative to a lot
    pub strategic_none: String,
    /// Subordinate award criteria, relative to a lot
    pub award_criteria: String,
    /// Weight number of one award criterion
    pub award_criterion_weight: String,
    /// Name of one award criterion
    pub award_criterion_name: String,
}

impl Default for NoticeLayout {
    fn default() -> Self {
        let main = "cac:ProcurementProject/cac:MainCommodityClassification/cbc:ItemClassificationCode";
        let additional =
            "cac:ProcurementProject/cac:AdditionalCommodityClassification/cbc:ItemClassificationCode";
        Self {
            project_main_code: main.to_string(),
            project_additional_codes: additional.to_string(),
            lot: "cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']".to_string(),
            lot_id: "cbc:ID[@schemeName='Lot']".to_string(),
            lot_project: "cac:ProcurementProject".to_string(),
            lot_main_code: main.to_string(),
            lot_additional_codes: additional.to_string(),
            notice_language: "cbc:NoticeLanguageCode".to_string(),
            schema_version: "cbc:CustomizationID".to_string(),
            strategic_env_impact: format!("{STRATEGIC_TYPE}[cbc:ProcurementTypeCode='env-imp']"),
            strategic_none: format!("{STRATEGIC_TYPE}[cbc:ProcurementTypeCode='none']"),
            award_criteria: "cac:TenderingTerms/cac:AwardingTerms/cac:AwardingCriterion\
                             /cac:SubordinateAwardingCriterion"
                .to_string(),
            award_criterion_weight: "ext:UBLExtensions/ext:UBLExtension/ext:ExtensionContent\
                /efext:EformsExtension/efac:AwardCriterionParameter\
                [efbc:ParameterCode/@listName='number-weight']/efbc:ParameterNumeric"
                .to_string(),
            award_criterion_name: "cbc:Name".to_string(),
        }
    }
}

/// Compiled [`NoticeLayout`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NoticePaths {
    pub project_main_code: NodePath,
    pub project_additional_codes: NodePath,
    pub lot: NodePath,
    pub lot_id: NodePath,
    pub lot_project: NodePath,
    pub lot_main_code: NodePath,
    pub lot_additional_codes: NodePath,
    pub notice_language: NodePath,
    pub schema_version: NodePath,
    pub strategic_env_impact: NodePath,
    pub strategic_none: NodePath,
    pub award_criteria: NodePath,
    pub award_criterion_weight: NodePath,
    pub award_criterion_name: NodePath,
}

impl NoticePaths {
    /// Compile every entry of `layout`
    ///
    /// # Errors
    /// Returns the first [`PathError`] met.
    pub fn compile(layout: &NoticeLayout) -> Result<Self, PathError> {
        Ok(Self {
            project_main_code: layout.project_main_code.parse()?,
            project_additional_codes: layout.project_additional_codes.parse()?,
            lot: layout.lot.parse()?,
            lot_id: layout.lot_id.parse()?,
            lot_project: layout.lot_project.parse()?,
            lot_main_code: layout.lot_main_code.parse()?,
            lot_additional_codes: layout.lot_additional_codes.parse()?,
            notice_language: layout.notice_language.parse()?,
            schema_version: layout.schema_version.parse()?,
            strategic_env_impact: layout.strategic_env_impact.parse()?,
            strategic_none: layout.strategic_none.parse()?,
            award_criteria: layout.award_criteria.parse()?,
            award_criterion_weight: layout.award_criterion_weight.parse()?,
            award_criterion_name: layout.award_criterion_name.parse()?,
        })
    }
}

//! Testing utilities for the GPP workspace
//!
//! Shared fixtures and builders. Everything here is plain text or JSON so
//! that every crate, including the lowest one, can use it from unit tests.

#![allow(missing_docs)]

use serde_json::{json, Value};
use std::path::PathBuf;

/// Fixture files embedded at compile time
pub mod fixtures {
    pub const TEST_NOTICE_MINIMAL: &str = include_str!("../fixtures/notices/test_notice_minimal.xml");
    pub const TEST_NOTICE_NO_LOT_CODES: &str =
        include_str!("../fixtures/notices/test_notice_no_lot_codes.xml");
    pub const TEST_NOTICE_STRATEGIC_NONE: &str =
        include_str!("../fixtures/notices/test_notice_strategic_none.xml");
    pub const TEST_NOTICE_AWARD_CRITERIA: &str =
        include_str!("../fixtures/notices/test_notice_award_criteria.xml");

    pub const GPP_DOCUMENTS_JSON: &str =
        include_str!("../fixtures/domain_knowledge/gpp_documents.json");
    pub const GPP_CRITERIA_JSON: &str = include_str!("../fixtures/domain_knowledge/gpp_criteria.json");
    pub const GPP_PATCHES_JSON: &str = include_str!("../fixtures/domain_knowledge/gpp_patches.json");

    pub const COMMON_AGGREGATE_XSD: &str = include_str!(
        "../fixtures/eForms-SDK/v1.13/schemas/common/UBL-CommonAggregateComponents-2.3.xsd"
    );
}

pub const CAC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";

/// Absolute path of a file under `fixtures/`
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(relative)
}

/// Root of the bundled eForms SDK excerpt
pub fn sdk_root() -> PathBuf {
    fixture_path("eForms-SDK")
}

pub fn documents_path() -> PathBuf {
    fixture_path("domain_knowledge/gpp_documents.json")
}

pub fn criteria_path() -> PathBuf {
    fixture_path("domain_knowledge/gpp_criteria.json")
}

pub fn patches_path() -> PathBuf {
    fixture_path("domain_knowledge/gpp_patches.json")
}

/// Award criterion inside a built lot
#[derive(Debug, Clone)]
pub struct AwardCriterionSpec {
    pub name: String,
    pub weight: String,
}

/// Lot inside a built notice
#[derive(Debug, Clone, Default)]
pub struct LotSpec {
    pub id: String,
    pub codes: Vec<String>,
    pub strategic: Vec<String>,
    pub award_criteria: Vec<AwardCriterionSpec>,
}

impl LotSpec {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn code(mut self, code: &str) -> Self {
        self.codes.push(code.to_string());
        self
    }

    /// Declare a `strategic-procurement` flag, e.g. `none` or `env-imp`
    pub fn strategic(mut self, flag: &str) -> Self {
        self.strategic.push(flag.to_string());
        self
    }

    pub fn award_criterion(mut self, name: &str, weight: &str) -> Self {
        self.award_criteria.push(AwardCriterionSpec {
            name: name.to_string(),
            weight: weight.to_string(),
        });
        self
    }
}

/// Builds eForms contract notice text
#[derive(Debug, Clone, Default)]
pub struct NoticeXmlBuilder {
    language: Option<String>,
    project_codes: Vec<String>,
    lots: Vec<LotSpec>,
}

impl NoticeXmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn project_code(mut self, code: &str) -> Self {
        self.project_codes.push(code.to_string());
        self
    }

    pub fn lot(mut self, lot: LotSpec) -> Self {
        self.lots.push(lot);
        self
    }

    pub fn build(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ContractNotice xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2"
    xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
    xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"
    xmlns:efac="http://data.europa.eu/p27/eforms-ubl-extension-aggregate-components/1"
    xmlns:efbc="http://data.europa.eu/p27/eforms-ubl-extension-basic-components/1"
    xmlns:efext="http://data.europa.eu/p27/eforms-ubl-extensions/1"
    xmlns:ext="urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2">
  <cbc:CustomizationID>eforms-sdk-1.13</cbc:CustomizationID>
"#,
        );
        if let Some(language) = &self.language {
            xml.push_str(&format!("  <cbc:NoticeLanguageCode>{language}</cbc:NoticeLanguageCode>\n"));
        }
        xml.push_str("  <cac:ProcurementProject>\n    <cbc:Name>Built notice</cbc:Name>\n");
        xml.push_str(&classifications(&self.project_codes, "    "));
        xml.push_str("  </cac:ProcurementProject>\n");

        for lot in &self.lots {
            xml.push_str("  <cac:ProcurementProjectLot>\n");
            xml.push_str(&format!("    <cbc:ID schemeName=\"Lot\">{}</cbc:ID>\n", lot.id));
            if !lot.award_criteria.is_empty() {
                xml.push_str(
                    "    <cac:TenderingTerms><cac:AwardingTerms><cac:AwardingCriterion>\n",
                );
                for criterion in &lot.award_criteria {
                    xml.push_str(&award_criterion(&criterion.name, &criterion.weight));
                }
                xml.push_str(
                    "    </cac:AwardingCriterion></cac:AwardingTerms></cac:TenderingTerms>\n",
                );
            }
            xml.push_str("    <cac:ProcurementProject>\n      <cbc:Name>Lot</cbc:Name>\n");
            for flag in &lot.strategic {
                xml.push_str(&format!(
                    "      <cac:ProcurementAdditionalType><cbc:ProcurementTypeCode \
                     listName=\"strategic-procurement\">{flag}</cbc:ProcurementTypeCode>\
                     </cac:ProcurementAdditionalType>\n"
                ));
            }
            xml.push_str(&classifications(&lot.codes, "      "));
            xml.push_str("    </cac:ProcurementProject>\n");
            xml.push_str("  </cac:ProcurementProjectLot>\n");
        }
        xml.push_str("</ContractNotice>\n");
        xml
    }
}

fn classifications(codes: &[String], indent: &str) -> String {
    let mut out = String::new();
    for (i, code) in codes.iter().enumerate() {
        let element = if i == 0 {
            "cac:MainCommodityClassification"
        } else {
            "cac:AdditionalCommodityClassification"
        };
        out.push_str(&format!(
            "{indent}<{element}><cbc:ItemClassificationCode listName=\"cpv\">{code}\
             </cbc:ItemClassificationCode></{element}>\n"
        ));
    }
    out
}

/// Subordinate award criterion carrying `weight` in the number-weight parameter
pub fn award_criterion(name: &str, weight: &str) -> String {
    format!(
        "<cac:SubordinateAwardingCriterion><ext:UBLExtensions><ext:UBLExtension>\
         <ext:ExtensionContent><efext:EformsExtension><efac:AwardCriterionParameter>\
         <efbc:ParameterCode listName=\"number-weight\">per-exa</efbc:ParameterCode>\
         <efbc:ParameterNumeric>{weight}</efbc:ParameterNumeric>\
         </efac:AwardCriterionParameter></efext:EformsExtension></ext:ExtensionContent>\
         </ext:UBLExtension></ext:UBLExtensions>\
         <cbc:Name>{name}</cbc:Name></cac:SubordinateAwardingCriterion>\n"
    )
}

/// Criterion record as it appears in the criteria JSON file
pub fn criterion_json(id: &str, criterion_type: &str, ambition: &str, codes: &[&str]) -> Value {
    json!({
        "gppDocument": "EU GPP Criteria for Furniture",
        "gppSource": "eu",
        "category": "Test category",
        "criterionType": criterion_type,
        "ambitionLevel": ambition,
        "id": id,
        "name": format!("Criterion {id}"),
        "relevantCpvCodes": codes,
        "environmentalImpactType": "other",
        "description": format!("Description of {id}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_files_exist() {
        for path in [sdk_root(), documents_path(), criteria_path(), patches_path()] {
            assert!(path.exists(), "{}", path.display());
        }
    }

    #[test]
    fn builder_emits_lots() {
        let xml = NoticeXmlBuilder::new()
            .language("ENG")
            .lot(LotSpec::new("LOT-0001").code("39110000").strategic("none"))
            .build();
        assert!(xml.contains(r#"<cbc:ID schemeName="Lot">LOT-0001</cbc:ID>"#));
        assert!(xml.contains("cac:MainCommodityClassification"));
        assert!(xml.contains(">none<"));
    }

    #[test]
    fn json_fixtures_are_arrays() {
        for text in [
            fixtures::GPP_DOCUMENTS_JSON,
            fixtures::GPP_CRITERIA_JSON,
            fixtures::GPP_PATCHES_JSON,
        ] {
            let value: Value = serde_json::from_str(text).unwrap();
            assert!(value.is_array());
        }
    }
}

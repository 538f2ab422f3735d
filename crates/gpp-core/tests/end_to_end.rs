//! Analyze, suggest and apply against real fixtures

use anyhow::Result;
use gpp_core::prelude::*;
use gpp_knowledge::KnowledgePaths;
use gpp_notice::{NodeId, NodePath};
use gpp_test_utils::{criteria_path, documents_path, fixtures, patches_path, sdk_root};
use pretty_assertions::assert_eq;

fn analyzer() -> Result<DefaultNoticeAnalyzer> {
    let config = AnalyzerConfig::new()
        .with_knowledge_paths(KnowledgePaths::new(documents_path(), criteria_path(), patches_path()))
        .with_sdk_root(sdk_root());
    Ok(DefaultNoticeAnalyzer::new(config)?)
}

fn only(criteria: &[SuggestedCriterion], lot_id: &str, id: &str) -> Vec<SuggestedCriterion> {
    criteria
        .iter()
        .filter(|c| c.lot_id == lot_id && c.id == id)
        .cloned()
        .collect()
}

fn child_names(notice: &Notice, parent: NodeId) -> Vec<String> {
    let doc = notice.document();
    doc.child_elements(parent)
        .filter_map(|child| doc.element(child))
        .map(|e| e.name().local_name().to_string())
        .collect()
}

#[test]
fn award_criterion_lands_in_lot() -> Result<()> {
    let analyzer = analyzer()?;
    let mut notice = analyzer.load_notice(fixtures::TEST_NOTICE_MINIMAL)?;
    let analysis = analyzer.analyze_notice(&notice);
    let selected = only(&analysis.suggested_gpp_criteria, "LOT-0002", "AC1");
    assert_eq!(selected.len(), 1);

    let patches = analyzer.suggest_patches(&notice, &selected)?;
    let names: Vec<&str> = patches.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Green Public Procurement Criteria - eu",
            "Green Procurement - other",
            "Strategic Procurement: Reduction of environmental impacts",
            "Tendering Terms",
            "Awarding Terms",
            "Award Criteria",
            "award criteria --- AC1: Low VOC emissions",
        ]
    );

    analyzer.apply_patches(&mut notice, &patches)?;

    let lot = notice.lot("LOT-0002").expect("lot exists");
    let criterion: NodePath = "cac:TenderingTerms/cac:AwardingTerms/cac:AwardingCriterion\
        /cac:SubordinateAwardingCriterion"
        .parse()?;
    let node = notice.document().node_at(lot, &criterion).expect("criterion created");
    let name = notice
        .document()
        .value_at(node, &notice.paths().award_criterion_name)
        .unwrap_or_default();
    assert!(name.contains("Low VOC emissions"), "{name}");
    let weight = notice
        .document()
        .value_at(node, &notice.paths().award_criterion_weight);
    assert_eq!(weight.as_deref(), Some("20"));

    // The other lot is untouched
    assert!(!notice.path_exists_in_lot("LOT-0001", &"cac:TenderingTerms".parse()?));
    Ok(())
}

#[test]
fn additional_types_follow_schema_order() -> Result<()> {
    let analyzer = analyzer()?;
    let mut notice = analyzer.load_notice(fixtures::TEST_NOTICE_MINIMAL)?;
    let analysis = analyzer.analyze_notice(&notice);
    let selected = only(&analysis.suggested_gpp_criteria, "LOT-0002", "CPC1");
    let patches = analyzer.suggest_patches(&notice, &selected)?;
    analyzer.apply_patches(&mut notice, &patches)?;

    let lot = notice.lot("LOT-0002").expect("lot exists");
    let project = notice
        .document()
        .node_at(lot, &notice.paths().lot_project)
        .expect("lot project");
    assert_eq!(
        child_names(&notice, project),
        vec![
            "ID",
            "Name",
            "ProcurementTypeCode",
            "ProcurementAdditionalType",
            "ProcurementAdditionalType",
            "ProcurementAdditionalType",
            "MainCommodityClassification",
            "AdditionalCommodityClassification",
            "PlannedPeriod",
        ]
    );
    assert!(notice.path_exists_in_lot("LOT-0002", &notice.paths().strategic_env_impact));
    Ok(())
}

#[test]
fn none_flag_is_replaced() -> Result<()> {
    let analyzer = analyzer()?;
    let mut notice = analyzer.load_notice(fixtures::TEST_NOTICE_STRATEGIC_NONE)?;
    assert!(notice.path_exists_in_lot("LOT-0001", &notice.paths().strategic_none));

    let analysis = analyzer.analyze_notice(&notice);
    let patches = analyzer.suggest_patches(&notice, &analysis.suggested_gpp_criteria)?;
    assert!(patches.iter().any(|p| p.op == PatchOperation::Remove));
    analyzer.apply_patches(&mut notice, &patches)?;

    assert!(!notice.path_exists_in_lot("LOT-0001", &notice.paths().strategic_none));
    assert!(notice.path_exists_in_lot("LOT-0001", &notice.paths().strategic_env_impact));
    Ok(())
}

#[test]
fn new_criterion_takes_share_beside_existing_ones() -> Result<()> {
    let analyzer = analyzer()?;
    let mut notice = analyzer.load_notice(fixtures::TEST_NOTICE_AWARD_CRITERIA)?;
    let analysis = analyzer.analyze_notice(&notice);
    let selected = only(&analysis.suggested_gpp_criteria, "LOT-0001", "AC1");
    let patches = analyzer.suggest_patches(&notice, &selected)?;

    // Tendering structure already exists, so no prerequisites are added
    assert!(!patches.iter().any(|p| p.name == "Tendering Terms"));
    analyzer.apply_patches(&mut notice, &patches)?;

    let lot = notice.lot("LOT-0001").expect("lot exists");
    let paths = notice.paths().clone();
    let weights: Vec<String> = notice
        .document()
        .nodes_at(lot, &paths.award_criteria)
        .into_iter()
        .filter_map(|c| notice.document().value_at(c, &paths.award_criterion_weight))
        .collect();
    assert_eq!(weights, vec!["60", "40", "20"]);
    Ok(())
}

#[test]
fn patched_notice_survives_serialization() -> Result<()> {
    let analyzer = analyzer()?;
    let mut notice = analyzer.load_notice(fixtures::TEST_NOTICE_MINIMAL)?;
    let analysis = analyzer.analyze_notice(&notice);
    let patches = analyzer.suggest_patches(&notice, &analysis.suggested_gpp_criteria)?;
    analyzer.apply_patches(&mut notice, &patches)?;

    let reparsed = analyzer.load_notice(&notice.to_xml_string())?;
    assert_eq!(reparsed.lot_ids(), notice.lot_ids());
    assert_eq!(reparsed.all_lot_codes("LOT-0002"), notice.all_lot_codes("LOT-0002"));
    let again = analyzer.analyze_notice(&reparsed);
    assert_eq!(again, analysis);
    Ok(())
}

//! Placement of created fragments under the lot project

use gpp_notice::{NodeId, Notice};
use gpp_patch::{PatchApplier, PatchOperation, SchemaOrder, SuggestedPatch, DEFAULT_TYPE_NAME};
use gpp_test_utils::{fixtures, CAC, CBC};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const EXT: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";

fn schema() -> SchemaOrder {
    SchemaOrder::from_xsd_str(fixtures::COMMON_AGGREGATE_XSD, DEFAULT_TYPE_NAME).unwrap()
}

/// Notice whose single lot project holds `children`, each written as `prefix:Local`
fn notice_with_project_children(children: &[&str]) -> Notice {
    let body: String = children.iter().map(|name| format!("<{name}/>")).collect();
    let xml = format!(
        r#"<ContractNotice xmlns="urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2"
            xmlns:cac="{CAC}" xmlns:cbc="{CBC}" xmlns:ext="{EXT}">
          <cac:ProcurementProjectLot>
            <cbc:ID schemeName="Lot">LOT-0001</cbc:ID>
            <cac:ProcurementProject>{body}</cac:ProcurementProject>
          </cac:ProcurementProjectLot>
        </ContractNotice>"#
    );
    Notice::parse(&xml).unwrap()
}

fn project(notice: &Notice) -> NodeId {
    let lot = notice.lot("LOT-0001").unwrap();
    notice.document().node_at(lot, &notice.paths().lot_project).unwrap()
}

fn child_names(notice: &Notice) -> Vec<String> {
    let doc = notice.document();
    doc.child_elements(project(notice))
        .filter_map(|child| doc.element(child))
        .map(|e| e.qualified_name())
        .collect()
}

fn create(element: &str) -> SuggestedPatch {
    SuggestedPatch::builder()
        .name("insert")
        .path("cac:ProcurementProject")
        .value(format!("<{element} xmlns:cac=\"{CAC}\" xmlns:cbc=\"{CBC}\"/>"))
        .op(PatchOperation::Create)
        .lot_id("LOT-0001")
        .build()
        .unwrap()
}

#[test]
fn inserts_between_schema_neighbours() {
    let mut notice = notice_with_project_children(&[
        "cbc:ID",
        "cbc:Name",
        "cac:MainCommodityClassification",
        "cac:RealizedLocation",
    ]);
    PatchApplier::with_schema(schema())
        .apply(&mut notice, &create("cac:ProcurementAdditionalType"))
        .unwrap();
    assert_eq!(
        child_names(&notice),
        vec![
            "cbc:ID",
            "cbc:Name",
            "cac:ProcurementAdditionalType",
            "cac:MainCommodityClassification",
            "cac:RealizedLocation",
        ]
    );
}

#[test]
fn unlisted_element_is_appended() {
    let mut notice = notice_with_project_children(&["cbc:ID", "cac:MainCommodityClassification"]);
    PatchApplier::with_schema(schema())
        .apply(&mut notice, &create("cac:TenderingTerms"))
        .unwrap();
    assert_eq!(
        child_names(&notice),
        vec!["cbc:ID", "cac:MainCommodityClassification", "cac:TenderingTerms"]
    );
}

#[test]
fn without_schema_everything_is_appended() {
    let mut notice = notice_with_project_children(&["cbc:ID", "cac:MainCommodityClassification"]);
    PatchApplier::new()
        .apply(&mut notice, &create("cac:ProcurementAdditionalType"))
        .unwrap();
    assert_eq!(child_names(&notice).last().map(String::as_str), Some("cac:ProcurementAdditionalType"));
}

proptest! {
    #[test]
    fn inserted_after_earlier_and_before_later_siblings(
        mask in prop::collection::vec(any::<bool>(), 21),
        target in 0usize..21,
    ) {
        let order = schema();
        let names = order.ordered_child_names();
        let existing: Vec<&str> = names
            .iter()
            .zip(&mask)
            .enumerate()
            .filter(|(i, (_, keep))| **keep && *i != target)
            .map(|(_, (name, _))| name.as_str())
            .collect();
        let mut notice = notice_with_project_children(&existing);
        let inserted = names[target].as_str();

        PatchApplier::with_schema(order.clone())
            .apply(&mut notice, &create(inserted))
            .unwrap();

        let children = child_names(&notice);
        let position = children.iter().position(|c| c == inserted).unwrap();
        for (i, child) in children.iter().enumerate() {
            let rank = names.iter().position(|n| n == child).unwrap();
            if i < position {
                prop_assert!(rank < target, "{child} should follow {inserted}");
            } else if i > position {
                prop_assert!(rank > target, "{child} should precede {inserted}");
            }
        }
    }
}

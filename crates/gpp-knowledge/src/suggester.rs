//! Patch suggestion for one notice
//!
//! For every lot the suggester emits, in order: source patches, impact
//! patches, strategic procurement patches, then one patch per clause preceded
//! by any missing prerequisite structure. The final list is deduplicated so
//! shared prerequisites appear once.

use crate::error::SuggestError;
use crate::model::{Criterion, PatchTemplate};
use gpp_notice::{escape_text, NodePath, Notice};
use gpp_patch::{dedup_patches, substitute, PatchOperation, SuggestedPatch, TemplateVars};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Template declaring the GPP criteria source
pub const SOURCE_TEMPLATE: &str = "Green Public Procurement Criteria";
/// Template declaring an environmental impact category
pub const IMPACT_TEMPLATE: &str = "Green Procurement";
/// Template declaring the `env-imp` strategic procurement flag
pub const STRATEGIC_TEMPLATE: &str = "Strategic Procurement: Reduction of environmental impacts";

/// Language used when the notice declares none
pub const DEFAULT_LANGUAGE: &str = "ENG";

const STRATEGIC_DESCRIPTION: &str =
    "GPP criteria will be used to evaluate the proposals, accounting for environmental impact";
const STRATEGIC_NONE_NAME: &str = "Strategic Procurement: None";
const STRATEGIC_NONE_DESCRIPTION: &str =
    "Removes the 'none' strategic procurement flag, superseded by environmental impact reduction";

/// Turns clauses into patches using a set of templates
#[derive(Debug, Clone, Default)]
pub struct PatchSuggester {
    templates: Vec<PatchTemplate>,
}

impl PatchSuggester {
    /// Create over the given templates
    #[must_use]
    pub fn new(templates: Vec<PatchTemplate>) -> Self {
        Self { templates }
    }

    /// All templates
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &[PatchTemplate] {
        &self.templates
    }

    /// Template by name, ignoring case
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&PatchTemplate> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Patches for every lot in `clauses_by_lot`
    ///
    /// Lots with no clauses produce nothing.
    ///
    /// # Errors
    /// Returns [`SuggestError::DependencyCycle`] if template prerequisites
    /// loop.
    pub fn suggest(
        &self,
        notice: &Notice,
        clauses_by_lot: &IndexMap<String, Vec<Criterion>>,
    ) -> Result<Vec<SuggestedPatch>, SuggestError> {
        let mut patches = Vec::new();
        for (lot_id, clauses) in clauses_by_lot {
            patches.extend(self.suggest_for_lot(notice, lot_id, clauses)?);
        }
        let suggested = dedup_patches(patches);
        info!(lots = clauses_by_lot.len(), patches = suggested.len(), "patches suggested");
        Ok(suggested)
    }

    /// Patches for one lot, before deduplication
    ///
    /// # Errors
    /// See [`PatchSuggester::suggest`].
    pub fn suggest_for_lot(
        &self,
        notice: &Notice,
        lot_id: &str,
        clauses: &[Criterion],
    ) -> Result<Vec<SuggestedPatch>, SuggestError> {
        if clauses.is_empty() {
            return Ok(Vec::new());
        }
        let base = base_variables(notice);
        let mut patches = Vec::new();

        let sources: IndexSet<&str> = clauses.iter().filter_map(Criterion::source).collect();
        for source in sources {
            patches.extend(self.labelled_patch(SOURCE_TEMPLATE, "source", source, &base, lot_id));
        }

        let impacts: IndexSet<&str> = clauses
            .iter()
            .filter_map(Criterion::environmental_impact)
            .collect();
        for impact in impacts {
            patches.extend(self.labelled_patch(
                IMPACT_TEMPLATE,
                "environmental_impact",
                impact,
                &base,
                lot_id,
            ));
        }

        patches.extend(self.strategic_patches(notice, lot_id, &base));

        for clause in clauses {
            patches.extend(self.clause_patches(notice, lot_id, clause, &base)?);
        }

        debug!(lot_id, clauses = clauses.len(), patches = patches.len(), "lot patches suggested");
        Ok(patches)
    }

    fn labelled_patch(
        &self,
        template_name: &str,
        variable: &str,
        label: &str,
        base: &TemplateVars,
        lot_id: &str,
    ) -> Option<SuggestedPatch> {
        let Some(template) = self.template(template_name) else {
            warn!(template = template_name, lot_id, "patch template not found");
            return None;
        };
        let mut vars = base.clone();
        vars.insert(variable.to_string(), escape_text(label).into_owned());
        let mut patch = instantiate(template, &vars, lot_id, format!("Declares '{label}' for the lot"));
        patch.name = format!("{} - {label}", template.name);
        Some(patch)
    }

    fn strategic_patches(
        &self,
        notice: &Notice,
        lot_id: &str,
        base: &TemplateVars,
    ) -> Vec<SuggestedPatch> {
        let paths = notice.paths();
        let mut patches = Vec::new();

        if !notice.path_exists_in_lot(lot_id, &paths.strategic_env_impact) {
            match self.template(STRATEGIC_TEMPLATE) {
                Some(template) => {
                    patches.push(instantiate(template, base, lot_id, STRATEGIC_DESCRIPTION.into()));
                }
                None => warn!(template = STRATEGIC_TEMPLATE, lot_id, "patch template not found"),
            }
        }

        if notice.path_exists_in_lot(lot_id, &paths.strategic_none) {
            patches.push(SuggestedPatch {
                name: STRATEGIC_NONE_NAME.to_string(),
                bt_ids: Vec::new(),
                depends_on: None,
                path: paths.strategic_none.as_str().to_string(),
                value: String::new(),
                op: PatchOperation::Remove,
                description: STRATEGIC_NONE_DESCRIPTION.to_string(),
                lot_id: lot_id.to_string(),
            });
        }
        patches
    }

    fn clause_patches(
        &self,
        notice: &Notice,
        lot_id: &str,
        clause: &Criterion,
        base: &TemplateVars,
    ) -> Result<Vec<SuggestedPatch>, SuggestError> {
        let clause_type = clause.clause_type();
        let Some(template_name) = clause_type.template_name() else {
            warn!(id = %clause.id, lot_id, "skipping clause: {clause_type}");
            return Ok(Vec::new());
        };
        let Some(template) = self.template(template_name) else {
            warn!(template = template_name, id = %clause.id, lot_id, "patch template not found");
            return Ok(Vec::new());
        };

        let mut vars = base.clone();
        for (key, value) in clause_type.variables(clause) {
            vars.insert(key, escape_text(&value).into_owned());
        }

        let description = format!(
            "{} '{}' ({}, {} ambition) from {}",
            clause.criterion_type, clause.name, clause.id, clause.ambition_level, clause.gpp_document
        );
        let mut patch = instantiate(template, &vars, lot_id, description);
        patch.name = format!("{} --- {}: {}", clause.criterion_type, clause.id, clause.name);

        self.with_prerequisites(notice, lot_id, template, patch, &vars)
    }

    /// Prepend create patches for missing ancestors of `patch`'s target
    fn with_prerequisites(
        &self,
        notice: &Notice,
        lot_id: &str,
        template: &PatchTemplate,
        patch: SuggestedPatch,
        vars: &TemplateVars,
    ) -> Result<Vec<SuggestedPatch>, SuggestError> {
        let mut chain = VecDeque::from([patch]);
        let mut visited = HashSet::from([template.name.to_ascii_lowercase()]);
        let mut current = template;

        loop {
            let target = current.path();
            match target.parse::<NodePath>() {
                Ok(path) if notice.path_exists_in_lot(lot_id, &path) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!(template = %current.name, path = target, %err, "template path is invalid");
                    break;
                }
            }

            let Some(parent_name) = current.prerequisite() else {
                debug!(template = %current.name, lot_id, "no prerequisite for missing path {target}");
                break;
            };
            if !visited.insert(parent_name.to_ascii_lowercase()) {
                return Err(SuggestError::DependencyCycle {
                    template: parent_name.to_string(),
                    lot_id: lot_id.to_string(),
                });
            }
            let Some(parent) = self.template(parent_name) else {
                warn!(template = parent_name, lot_id, "prerequisite template not found");
                break;
            };

            debug!(template = %parent.name, lot_id, "adding prerequisite patch");
            let description = format!("Adds the missing '{}' structure", parent.name);
            chain.push_front(instantiate(parent, vars, lot_id, description));
            current = parent;
        }

        Ok(chain.into())
    }
}

/// Variables shared by every template: namespace URIs and the language
fn base_variables(notice: &Notice) -> TemplateVars {
    let mut vars = TemplateVars::new();
    for (prefix, uri) in notice.document().namespaces().prefixes() {
        vars.insert(format!("ns_{prefix}"), escape_text(uri).into_owned());
    }
    let language = notice
        .notice_language()
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    vars.insert("language".into(), escape_text(&language).into_owned());
    vars
}

fn instantiate(
    template: &PatchTemplate,
    vars: &TemplateVars,
    lot_id: &str,
    description: String,
) -> SuggestedPatch {
    SuggestedPatch {
        name: template.name.clone(),
        bt_ids: template.bt_ids.clone(),
        depends_on: template.prerequisite().map(str::to_string),
        path: template.path().to_string(),
        value: substitute(&template.value, vars),
        op: PatchOperation::Create,
        description,
        lot_id: lot_id.to_string(),
    }
}

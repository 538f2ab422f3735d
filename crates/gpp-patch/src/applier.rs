//! Applies suggested patches to a notice
//!
//! # Operations
//!
//! - **create**: parse the value and insert it under the node at `path`.
//!   Under the lot's procurement project, and with a [`SchemaOrder`]
//!   available, the fragment goes before its first schema successor already
//!   present; otherwise it is appended.
//! - **update**: replace the node at `path`, keeping its position.
//! - **remove**: detach the node at `path`; a missing node is not an error.

use crate::error::ApplyError;
use crate::patch::{PatchOperation, SuggestedPatch};
use crate::schema::SchemaOrder;
use gpp_notice::{Document, NodeId, NodePath, Notice};
use tracing::{debug, error, warn};

/// What applying one patch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// New fragment root
    Created(NodeId),
    /// Replacement fragment root
    Updated(NodeId),
    /// Target detached
    Removed,
    /// Target absent, nothing changed
    NothingRemoved,
}

/// Patch applier with optional schema ordering
#[derive(Debug, Clone, Default)]
pub struct PatchApplier {
    schema: Option<SchemaOrder>,
}

impl PatchApplier {
    /// Applier that always appends created fragments
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { schema: None }
    }

    /// Applier that orders fragments under the lot project by `schema`
    #[inline]
    #[must_use]
    pub fn with_schema(schema: SchemaOrder) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Schema order in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> Option<&SchemaOrder> {
        self.schema.as_ref()
    }

    /// Apply one patch according to its operation
    ///
    /// # Errors
    /// Returns [`ApplyError`] naming the lot, path or value that failed.
    pub fn apply(
        &self,
        notice: &mut Notice,
        patch: &SuggestedPatch,
    ) -> Result<ApplyOutcome, ApplyError> {
        debug!(%patch, "applying patch");
        let result = match patch.op {
            PatchOperation::Create => self.create(notice, patch).map(ApplyOutcome::Created),
            PatchOperation::Update => self.update(notice, patch).map(ApplyOutcome::Updated),
            PatchOperation::Remove => self.remove(notice, patch).map(|removed| {
                if removed {
                    ApplyOutcome::Removed
                } else {
                    ApplyOutcome::NothingRemoved
                }
            }),
        };
        if let Err(e) = &result {
            error!(patch = %patch.name, lot = %patch.lot_id, error = %e, "patch failed");
        }
        result
    }

    /// Apply patches in order, stopping at the first failure
    ///
    /// # Errors
    /// Returns the first [`ApplyError`]; earlier patches stay applied.
    pub fn apply_all(
        &self,
        notice: &mut Notice,
        patches: &[SuggestedPatch],
    ) -> Result<Vec<ApplyOutcome>, ApplyError> {
        patches.iter().map(|patch| self.apply(notice, patch)).collect()
    }

    /// Insert the patch value under the node at its path
    ///
    /// # Errors
    /// Returns [`ApplyError`] if the lot, the insertion point or the value is
    /// invalid.
    pub fn create(&self, notice: &mut Notice, patch: &SuggestedPatch) -> Result<NodeId, ApplyError> {
        let lot = resolve_lot(notice, patch)?;
        let path = parse_path(patch)?;
        let parent = notice
            .document()
            .node_at(lot, &path)
            .ok_or_else(|| ApplyError::InvalidPath(patch.path.clone()))?;
        let fragment = parse_value(notice.document(), patch)?;

        let at_project = notice
            .document()
            .node_at(lot, &notice.paths().lot_project)
            == Some(parent);

        let document = notice.document_mut();
        let created = match (&self.schema, fragment.element(fragment.root())) {
            (Some(schema), Some(root)) if at_project => {
                let successors = schema.successors_of(root.name());
                debug!(
                    element = %root.qualified_name(),
                    candidates = successors.len(),
                    "inserting by schema order"
                );
                document.insert_fragment_before(parent, &fragment, successors)
            }
            _ => document.insert_fragment(parent, &fragment),
        };
        Ok(created)
    }

    /// Replace the node at the patch path, keeping its position
    ///
    /// # Errors
    /// Returns [`ApplyError`] if the lot, the target node, its parent or the
    /// value is invalid.
    pub fn update(&self, notice: &mut Notice, patch: &SuggestedPatch) -> Result<NodeId, ApplyError> {
        let lot = resolve_lot(notice, patch)?;
        let path = parse_path(patch)?;
        let target = notice
            .document()
            .node_at(lot, &path)
            .ok_or_else(|| ApplyError::NodeNotFound(patch.path.clone()))?;
        if notice.document().parent(target).is_none() {
            return Err(ApplyError::ParentNotFound(patch.path.clone()));
        }
        let fragment = parse_value(notice.document(), patch)?;

        notice
            .document_mut()
            .replace_node(target, &fragment)
            .ok_or_else(|| ApplyError::ParentNotFound(patch.path.clone()))
    }

    /// Detach the node at the patch path
    ///
    /// Returns `Ok(false)` when nothing matched.
    ///
    /// # Errors
    /// Returns [`ApplyError`] if the lot or the path is invalid.
    pub fn remove(&self, notice: &mut Notice, patch: &SuggestedPatch) -> Result<bool, ApplyError> {
        let lot = resolve_lot(notice, patch)?;
        let path = parse_path(patch)?;
        let removed = notice.document_mut().remove_at(lot, &path);
        if !removed {
            warn!(path = %patch.path, lot = %patch.lot_id, "nothing removed");
        }
        Ok(removed)
    }
}

fn resolve_lot(notice: &Notice, patch: &SuggestedPatch) -> Result<NodeId, ApplyError> {
    notice
        .lot(&patch.lot_id)
        .ok_or_else(|| ApplyError::LotNotFound(patch.lot_id.clone()))
}

fn parse_path(patch: &SuggestedPatch) -> Result<NodePath, ApplyError> {
    patch
        .path
        .parse()
        .map_err(|_| ApplyError::InvalidPath(patch.path.clone()))
}

fn parse_value(document: &Document, patch: &SuggestedPatch) -> Result<Document, ApplyError> {
    Document::parse(&patch.value, document.namespaces()).map_err(|source| {
        ApplyError::InvalidValue {
            value: patch.value.clone(),
            source,
        }
    })
}
